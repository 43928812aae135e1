// Use the library crate (whose name is defined in Cargo.toml)
use lilt::Evaluator;
use lilt::lexer::tokenize;
use lilt::parser::parse;

fn main() {
    let input = "let mut total = 0\n\
                 total = (1 + 2) * 3\n\
                 if total >= 9 { \"big\" } else { \"small\" }";
    println!("Input:\n{}\n", input);

    let tokens = match tokenize(input) {
        Ok(tokens) => tokens,
        Err(e) => {
            e.pretty_print(input);
            return;
        }
    };

    println!("Tokens:");
    for token in &tokens {
        println!("  {:?}", token);
    }

    let program = match parse(tokens) {
        Ok(program) => program,
        Err(e) => {
            e.pretty_print(input);
            return;
        }
    };

    let mut evaluator = Evaluator::new();
    match evaluator.evaluate(&program) {
        Ok(value) => println!("\nResult: {}", value),
        Err(e) => e.pretty_print(input),
    }
}

//! Minimal usage: construct → duplicate a string → checkpoint → print.

use tidemark::Arena;

fn main() {
    let mut arena = Arena::new(1024);

    let Some(greeting) = arena.alloc_str("hello World") else {
        eprintln!("arena allocation failed");
        std::process::exit(1);
    };
    arena.push_marker();

    if let Some(text) = arena.get_str(&greeting) {
        println!("{text}");
    }

    arena.destroy();
}

//! `hello` — the first ko6 program: greets whoever is at the console.
//!
//! Grounded on `examples/original_source/src/soft/uapp/hello/main.c`, minus
//! the fourth ("other") file descriptor the original writes its closing
//! line to — ko6's `WRITE` syscall only recognizes stdout/stderr (see
//! `kernel::syscall`).

use ko6_user_lib::{alloc_crate::string::String, eprintln, io::stdin, print, println};

pub extern "C" fn main(_arg: usize) {
    println!();
    println!("  _     ___    __");
    println!(" | |__ /'v'\\  / /      ko6");
    println!(" | / /(     )/ _ \\");
    println!(" |_\\_\\ x___x \\___/");
    println!();
    println!("Hello world!");
    print!("What's your name? ");

    let mut name = String::new();
    let mut input = stdin();
    match input.read_line(&mut name) {
        Ok(_) => {
            let name = name.trim_end_matches(['\n', '\r']);
            eprintln!("Hello {name}!");
        }
        Err(e) => eprintln!("hello: couldn't read a name: {e}"),
    }
    println!("The end");
}

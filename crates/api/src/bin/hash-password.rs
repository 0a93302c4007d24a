use std::env;

use lobianco_core::auth::hash_password;

fn main() {
    let password = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin hash-password <PASSWORD>");
        std::process::exit(1);
    });

    match hash_password(&password) {
        Ok(hashed) => {
            println!("\nHash : {hashed}\n");
            println!("# Paste this into your .env (single quotes keep the $ signs):");
            println!("ADMIN_PASSWORD_HASH='{hashed}'");
        }
        Err(e) => {
            eprintln!("Error hashing password: {e}");
            std::process::exit(1);
        }
    }
}

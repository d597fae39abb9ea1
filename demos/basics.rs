use bankotp::{generate_code_now, generate_secret, remaining_seconds_now, verify_code_now};

fn main() {
    let secret = match generate_secret() {
        Ok(secret) => secret,
        Err(e) => {
            eprintln!("enrollment failed: {e}");
            return;
        }
    };

    let code = generate_code_now(&secret);

    println!("secret   : {secret}");
    println!("code     : {code}");
    match remaining_seconds_now() {
        Ok(remaining) => println!("expires  : {remaining}s"),
        Err(e) => eprintln!("clock    : {e}"),
    }
    println!("verified : {}", verify_code_now(&code, &secret));

    // Secrets survive the separators humans paste them with.
    let spaced = secret
        .as_bytes()
        .chunks(4)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join(" ");
    println!("spaced   : {}", verify_code_now(&code, &spaced));
}

use qsfilter::prelude::*;

fn main() {
    let query = std::env::args().skip(1).collect::<Vec<_>>().join("&");
    println!("Input: '{query}'");

    let raw = RawQuery::parse(&query);
    println!("\nRaw:\n{raw:#?}");

    let compiler = Compiler::new(Options::default().with_populate(true));
    match compiler.compile(&raw) {
        Ok(descriptor) => println!(
            "\nDescriptor:\n{}",
            serde_json::to_string_pretty(&descriptor).expect("Failed to render descriptor")
        ),
        Err(err) => eprintln!("\nFailed to compile: {err}"),
    }
}

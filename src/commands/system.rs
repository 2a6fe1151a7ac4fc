pub enum SystemCommand {
    Help,
    Exit,
}

pub fn parse(input: &str) -> Option<SystemCommand> {
    match input.to_lowercase().as_str() {
        "help" => Some(SystemCommand::Help),
        "exit" | "quit" => Some(SystemCommand::Exit),
        _ => None,
    }
}

pub fn print_help() {
    println!("\n🧠 NexusThink - Your Private Document Intelligence Companion");
    println!();
    println!("📄 Document Commands:");
    println!("  upload <file>  - Upload a research document (PDF) for analysis");
    println!("  doc <file>     - Same as upload");
    println!("  status         - Show the indexed document");
    println!("  reset          - Forget the indexed document");
    println!();
    println!("💬 Questions:");
    println!("  Type any question about the document once it is processed");
    println!();
    println!("⚙️ System Commands:");
    println!("  help  - Show this help menu");
    println!("  exit  - Exit the program");
    println!();
}

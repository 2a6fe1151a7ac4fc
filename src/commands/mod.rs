use colored::Colorize;
use std::sync::Arc;

use crate::session::{RagContext, Session};

mod document;
mod system;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

/// Routes REPL input: document commands, system commands, and everything
/// else as a question about the indexed document.
pub struct CommandHandler {
    session: Session,
}

impl CommandHandler {
    pub fn new(ctx: &Arc<RagContext>) -> Self {
        Self {
            session: ctx.new_session(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<CommandOutcome, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(CommandOutcome::Continue);
        }

        if let Some(command) = system::parse(input) {
            return Ok(match command {
                system::SystemCommand::Help => {
                    system::print_help();
                    CommandOutcome::Continue
                }
                system::SystemCommand::Exit => {
                    println!("👋 Goodbye!");
                    CommandOutcome::Exit
                }
            });
        }

        match input.to_lowercase().as_str() {
            "status" => {
                document::show_status(&self.session)?;
                return Ok(CommandOutcome::Continue);
            }
            "reset" => {
                self.session.reset();
                println!("{}", "🔄 Session cleared. Upload a new document to continue.".cyan());
                return Ok(CommandOutcome::Continue);
            }
            "upload" | "doc" => {
                document::handle_upload("", &mut self.session).await?;
                return Ok(CommandOutcome::Continue);
            }
            _ => {}
        }

        if let Some(path) = input.strip_prefix("upload ").or_else(|| input.strip_prefix("doc ")) {
            document::handle_upload(path, &mut self.session).await?;
            return Ok(CommandOutcome::Continue);
        }

        document::handle_question(input, &mut self.session).await?;
        Ok(CommandOutcome::Continue)
    }
}

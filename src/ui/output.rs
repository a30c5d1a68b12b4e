use chrono::{DateTime, Local, Utc};
use colored::*;
use serde_json::Value;

use crate::models::Session;

pub fn display_success(message: &str) {
    println!("{}", message.green());
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red(), message);
}

/// Pretty-print a response body
pub fn display_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

pub fn display_session(session: &Session, updated_at: Option<DateTime<Utc>>) {
    if !session.is_authenticated() {
        println!("{}", "Not logged in".yellow());
        return;
    }

    println!("{}", "Logged in".green());
    match &session.current_user {
        Some(user) => {
            println!("  {} {}", "name:".dimmed(), user.name);
            println!("  {} {}", "email:".dimmed(), user.email);
            println!("  {} {}", "role:".dimmed(), user.role.to_string().cyan());
        }
        None => println!("  {}", "no cached profile".dimmed()),
    }
    if let Some(updated_at) = updated_at {
        let local: DateTime<Local> = updated_at.into();
        println!(
            "  {} {}",
            "saved:".dimmed(),
            local.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

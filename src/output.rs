use chrono::Local;
use console::style;
use notekeeper::notes::Note;

pub fn header(title: &str) {
    println!("{}", style(title).bold().underlined());
}

pub fn hint(msg: &str) {
    println!("{} {}", style("hint:").cyan().bold(), style(msg).dim());
}

pub fn error(msg: &str) {
    eprintln!("{} {}", style("error:").red().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// `last_update` in local time, or the raw value if it does not parse.
pub fn updated_label(note: &Note) -> String {
    note.last_updated_at()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| note.last_update.clone())
}

pub fn note(note: &Note) {
    println!(
        "{}  {}",
        style(&note.note_title).bold(),
        style(updated_label(note)).dim()
    );
    println!("{}", style(format!("id: {}", note.note_id)).dim());
    if !note.note_content.is_empty() {
        println!("{}", note.note_content);
    }
}

pub fn note_list(notes: &[Note]) {
    if notes.is_empty() {
        hint("No notes yet. Create one with `notekeeper create`.");
        return;
    }
    for (i, n) in notes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        note(n);
    }
}

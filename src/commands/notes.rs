use super::App;
use crate::output;
use anyhow::{bail, Result};
use clap::Args;
use notekeeper::notes::Notes;
use notekeeper::view::{NoteBoard, NoteEditor, ViewState};

#[derive(Args)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    pub query: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub content: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,

    #[arg(short, long, required_unless_present = "content")]
    pub title: Option<String>,

    #[arg(short, long, required_unless_present = "title")]
    pub content: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,
}

fn render_board(board: &NoteBoard) {
    match board.state() {
        ViewState::Unauthenticated => {
            output::hint("Sign in to view and create notes.");
        }
        ViewState::Loading => {}
        ViewState::Ready => match board.error() {
            Some(err) => output::error(err),
            None => {
                output::header("Your Notes");
                output::note_list(board.notes());
            }
        },
    }
}

fn require_session(app: &App) -> Result<()> {
    if !app.session.is_authenticated() {
        bail!("Not signed in. Run `notekeeper signin` first.");
    }
    Ok(())
}

pub async fn list(app: &App, args: ListArgs) -> Result<()> {
    let notes = Notes::new(&app.client, &app.session);
    let mut board = NoteBoard::with_query(args.query.unwrap_or_default());
    board.refresh(&notes).await?;
    render_board(&board);
    Ok(())
}

pub async fn create(app: &App, args: CreateArgs) -> Result<()> {
    require_session(app)?;
    let notes = Notes::new(&app.client, &app.session);
    let mut board = NoteBoard::new();
    let created = board.create(&notes, &args.title, &args.content).await?;
    output::success(&format!("Created \"{}\"", created.note_title));
    render_board(&board);
    Ok(())
}

pub async fn show(app: &App, args: ShowArgs) -> Result<()> {
    require_session(app)?;
    let notes = Notes::new(&app.client, &app.session);
    let note = notes.get(&args.id).await?;
    output::note(&note);
    Ok(())
}

pub async fn edit(app: &App, args: EditArgs) -> Result<()> {
    require_session(app)?;
    let notes = Notes::new(&app.client, &app.session);
    let mut editor = NoteEditor::new(args.id);
    editor.load(&notes).await?;
    let saved = editor
        .save(&notes, args.title.as_deref(), args.content.as_deref())
        .await?;
    output::success("Note updated.");
    output::note(&saved);
    Ok(())
}

pub async fn delete(app: &App, args: DeleteArgs) -> Result<()> {
    require_session(app)?;
    let notes = Notes::new(&app.client, &app.session);
    let mut board = NoteBoard::new();
    board.delete(&notes, &args.id).await?;
    output::success("Note deleted.");
    render_board(&board);
    Ok(())
}

//! Line-oriented front end for the inventory screen.
//!
//! Reads one command per line, applies it through [`InventoryScreen`] and
//! prints the refreshed view. Generic over the IO halves so it can be driven
//! from stdin/stdout or from in-memory buffers.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use stockpos_infra::InventoryStore;
use stockpos_inventory::InventoryRecord;

use crate::controller::{InventoryScreen, SubmitOutcome};
use crate::form::FormField;

pub const HELP: &str = "\
commands:
  list                 reload the inventory
  add                  start a new item
  edit <n>             load row n into the form
  name|sku|qty|price <value>
                       set a form field
  save                 add or update the item in the form
  clear                discard the form
  delete <n>           remove row n (asks first)
  help                 show this text
  quit                 exit";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("`{0}` needs a row number")]
    MissingRow(&'static str),

    #[error("not a row number: {0}")]
    BadRow(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add,
    /// 1-based row in the displayed list.
    Edit(usize),
    Set(FormField, String),
    Save,
    Clear,
    Delete(usize),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        if let Some(field) = FormField::parse(word) {
            return Ok(Some(Command::Set(field, rest.to_string())));
        }

        let cmd = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" | "reload" => Command::List,
            "add" | "new" => Command::Add,
            "edit" => Command::Edit(row(rest, "edit")?),
            "save" | "submit" => Command::Save,
            "clear" | "cancel" => Command::Clear,
            "delete" | "rm" => Command::Delete(row(rest, "delete")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(Some(cmd))
    }
}

fn row(arg: &str, command: &'static str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingRow(command));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::BadRow(arg.to_string())),
    }
}

/// Drive `screen` from `input` until `quit` or end of input.
///
/// The caller mounts the screen first; the loop only prints and dispatches.
pub async fn run<S, R, W>(screen: &InventoryScreen<S>, input: R, output: &mut W) -> std::io::Result<()>
where
    S: InventoryStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_view(screen, output).await?;

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(err) => {
                writeln(output, &err.to_string()).await?;
                continue;
            }
        };

        match cmd {
            Command::Quit => break,
            Command::Help => {
                writeln(output, HELP).await?;
                continue;
            }
            Command::List => screen.load().await,
            Command::Add | Command::Clear => screen.reset().await,
            Command::Set(field, value) => screen.set_field(field, &value).await,
            Command::Edit(n) => match row_record(screen, n).await {
                Some(record) => screen.begin_edit(&record).await,
                None => {
                    writeln(output, &format!("no row {n}")).await?;
                    continue;
                }
            },
            Command::Save => match screen.submit().await {
                SubmitOutcome::Saved => writeln(output, "Saved.").await?,
                SubmitOutcome::Rejected(prompt) => {
                    writeln(output, &format!("{}: {}", prompt.title, prompt.message)).await?;
                    continue;
                }
                // The failure message is part of the view.
                SubmitOutcome::Failed(_) => {}
            },
            Command::Delete(n) => {
                let Some(record) = row_record(screen, n).await else {
                    writeln(output, &format!("no row {n}")).await?;
                    continue;
                };
                let prompt = screen.request_delete(&record).await;
                output
                    .write_all(format!("{} {} [y/N] ", prompt.title(), prompt.message()).as_bytes())
                    .await?;
                output.flush().await?;

                if confirmed(&mut lines).await? {
                    screen.confirm_delete(prompt).await;
                } else {
                    writeln(output, "Kept.").await?;
                    continue;
                }
            }
        }

        write_view(screen, output).await?;
    }

    Ok(())
}

async fn row_record<S: InventoryStore>(screen: &InventoryScreen<S>, n: usize) -> Option<InventoryRecord> {
    screen.snapshot().await.items().get(n - 1).cloned()
}

async fn confirmed<R>(lines: &mut Lines<R>) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn write_view<S, W>(screen: &InventoryScreen<S>, output: &mut W) -> std::io::Result<()>
where
    S: InventoryStore,
    W: AsyncWrite + Unpin,
{
    let view = screen.view().await;
    output.write_all(format!("\n{view}").as_bytes()).await?;
    output.flush().await
}

async fn writeln<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await
}

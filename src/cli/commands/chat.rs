//! Chat command - interactive conversation over the indexed documents

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::error::RagError;
use crate::core::services::Services;
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Lines that end the session
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", "/bye"];

/// Arguments for the chat command
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Chat model to use instead of the configured one
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Skip the opening greeting from the model
    #[arg(long)]
    pub no_greeting: bool,

    /// Print the ids of the chunks used for each answer
    #[arg(long, short = 's')]
    pub sources: bool,
}

/// Execute the chat command on stdin/stdout
pub async fn execute(
    args: ChatArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(&args, services, format, stdin, &mut stdout).await
}

/// Drive one conversation from `input` until EOF or an exit command.
///
/// A failed turn is reported and the session continues. A conversation
/// that expired while idle is replaced by a fresh one. The conversation
/// is ended on return.
pub async fn run_session<R, W>(
    args: &ChatArgs,
    services: &Services,
    format: OutputFormat,
    input: R,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut conversation_id = if args.no_greeting {
        services.conversations.create()
    } else {
        let start = services.chat.start().await?;
        match format {
            OutputFormat::Human => writeln!(out, "{} {}", colors::prompt("ai>"), start.response.trim())?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&start)?)?,
        }
        start.conversation_id
    };

    let result = converse(args, services, format, input, out, &mut conversation_id).await;

    if let Err(e) = services.conversations.end(&conversation_id) {
        tracing::debug!("Conversation already gone: {}", e);
    }
    result
}

async fn converse<R, W>(
    args: &ChatArgs,
    services: &Services,
    format: OutputFormat,
    input: R,
    out: &mut W,
    conversation_id: &mut String,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        if format == OutputFormat::Human {
            write!(out, "{} ", colors::prompt("you>"))?;
            out.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line.to_ascii_lowercase().as_str()) {
            break;
        }

        let model = args.model.as_deref();
        let result = match services.chat.query(line, Some(conversation_id.as_str()), model).await {
            Err(RagError::ConversationNotFound(_)) => {
                let expired = std::mem::replace(conversation_id, services.conversations.create());
                tracing::info!("Conversation {} expired, continuing in {}", expired, conversation_id);
                if format == OutputFormat::Human {
                    writeln!(out, "{}", colors::dim("Conversation expired, starting a new one"))?;
                }
                services.chat.query(line, Some(conversation_id.as_str()), model).await
            }
            other => other,
        };

        match result {
            Ok(response) => match format {
                OutputFormat::Human => {
                    writeln!(out, "{} {}", colors::prompt("ai>"), response.response.trim())?;
                    if args.sources && !response.sources.is_empty() {
                        writeln!(out, "{}", colors::dim(&response.sources.join(", ")))?;
                    }
                }
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&response)?)?,
            },
            Err(e) => {
                writeln!(out, "{}: {}", colors::error("Error"), e)?;
            }
        }
    }

    Ok(())
}

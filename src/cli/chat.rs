//! `parley chat` and `parley complete` handlers.

use std::io::Write;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::RelayClient;
use crate::completions::{CompletionsClient, CompletionsConfig};

/// Handle `parley chat`: one-shot with a prompt, otherwise a line REPL.
pub async fn handle_chat(args: super::ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = RelayClient::new(args.url);

    if let Some(prompt) = args.prompt {
        let reply = client.send_message(&prompt, &[]).await?;
        println!("{reply}");
        return Ok(());
    }

    eprintln!("Connected to {}. Ctrl-D to quit.", client.url());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut thread_id: Option<String> = None;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // The thread holds the conversation, so only the new message goes up.
        let mut request = client.request(line, &[]);
        request.thread_id = thread_id.clone();
        match client.send_turn(&request).await {
            Ok(reply) => {
                if reply.thread_id.is_some() {
                    thread_id = reply.thread_id.clone();
                }
                println!("{}", reply.text);
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    println!();
    Ok(())
}

/// Handle `parley complete`: ask the completions deployment directly.
pub async fn handle_complete(args: super::CompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = CompletionsClient::new(CompletionsConfig::from_env())?;

    if !args.stream {
        let reply = client.send_message(&args.prompt, &[]).await?;
        println!("{reply}");
        return Ok(());
    }

    let mut deltas = client.stream_message(&args.prompt, &[]).await?;
    while let Some(delta) = deltas.next().await {
        print!("{}", delta?);
        std::io::stdout().flush()?;
    }
    println!();
    Ok(())
}

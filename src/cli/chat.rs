use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use log::info;

use super::ChatArgs;
use crate::widget::transport::{ HttpRelay, RelayTransport };
use crate::widget::{ ChatWidget, Rejected, WidgetConfig };

/// Terminal front-end for the widget state machine. Reads one question per
/// line until EOF, `/quit`, or the session's turn limit.
pub async fn run_chat(args: &ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let transport: Option<Arc<dyn RelayTransport>> = match &args.relay_url {
        Some(url) if !url.trim().is_empty() => {
            info!("Using relay at {}", url);
            Some(Arc::new(HttpRelay::new(url.trim())?))
        }
        _ => None,
    };

    let mut widget = ChatWidget::new(WidgetConfig::default(), transport);
    if let Some(greeting) = widget.transcript().first() {
        println!("assistant: {}", greeting.message.content);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        match widget.submit(&line).await {
            Ok(reply) => println!("assistant: {}", reply),
            Err(Rejected::Blank) | Err(Rejected::Busy) => continue,
            Err(Rejected::LimitReached) => {
                println!("(this session has reached its message limit)");
                break;
            }
        }
    }

    info!("Chat session {} ended after {} turns", widget.session_id(), widget.turns());
    Ok(())
}

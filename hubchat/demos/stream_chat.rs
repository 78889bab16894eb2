//! Stream one reply from an agent backend to stdout.
//!
//! ```text
//! HUBCHAT_ENDPOINT=http://localhost:7777 \
//! HUBCHAT_RESOURCE_TYPE=team HUBCHAT_RESOURCE_ID=research \
//! cargo run --example stream_chat -- agno "What changed today?"
//! ```
//!
//! Set `HUBCHAT_VARIANT=hub` to go through the hub gateway.

use std::io::Write;

use hubchat::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hubchat::telemetry::init_tracing();

    let mut args = std::env::args().skip(1);
    let framework = args
        .next()
        .or_else(|| std::env::var("HUBCHAT_FRAMEWORK").ok())
        .unwrap_or_else(|| "agno".to_string());
    let prompt = args.collect::<Vec<_>>().join(" ");
    let prompt = if prompt.is_empty() { "Hello!".to_string() } else { prompt };

    let variant = match std::env::var("HUBCHAT_VARIANT").as_deref() {
        Ok("hub") => AdapterVariant::Hub,
        _ => AdapterVariant::Direct,
    };

    let adapter = AdapterFactory::create(&framework, variant)?;
    adapter.initialize(AdapterConfig::from_env()?)?;

    let mut printed = 0;
    let mut callbacks = FnCallbacks::new()
        .with_chunk(move |chunk| {
            // Chunks are cumulative; print only the new tail.
            if let Some(tail) = chunk.content.get(printed..) {
                print!("{tail}");
                let _ = std::io::stdout().flush();
            }
            printed = chunk.content.len();
        })
        .with_system_event(|event| eprintln!("[{}]", event.event))
        .with_session_id(|id| eprintln!("[session {id}]"))
        .with_complete(|response| {
            println!();
            if let Some(reasoning) = response.reasoning_content {
                eprintln!("--- reasoning ---\n{reasoning}");
            }
        })
        .with_error(|err| eprintln!("\nerror: {err}"));

    let outcome = adapter
        .send_message(ChatMessage::new(prompt), &mut callbacks, &[])
        .await?;
    tracing::info!(?outcome, framework = %adapter.framework(), "done");

    adapter.dispose();
    Ok(())
}

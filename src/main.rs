// css-inline-optimizer CLI
// Entry point; the library does the work

mod cli;

use cli::CliHandler;

#[tokio::main]
async fn main() {
    let handler = CliHandler::new();

    if let Err(e) = handler.run().await {
        css_inline_optimizer::utils::Logger::error(&e.format_detailed());
        std::process::exit(1);
    }
}

use std::process::ExitCode;
use teachassist::errors::{StreamError, TeachAssistError};
use teachassist::streaming::CancelToken;

#[tokio::main]
async fn main() -> ExitCode {
    // Ctrl-C / SIGTERM cancels the running generation; the read loop
    // notices and returns instead of being dropped mid-flight.
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        on_signal.cancel();
    });

    match teachassist::cli::run(cancel).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<TeachAssistError>() {
                Some(TeachAssistError::Stream(StreamError::Cancelled)) => {
                    eprintln!("\nGeneration cancelled");
                }
                // Already shown by the notifier
                Some(TeachAssistError::Api(_)) | Some(TeachAssistError::Stream(_)) => {}
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::from(teachassist::errors::get_exit_code(&e))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(_) => {
                ctrl_c.await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
}

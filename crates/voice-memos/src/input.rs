//! Stdin line forwarding.
//!
//! Stdin is read on a dedicated OS thread with blocking `lines()` and
//! forwarded over a channel. The receiver is shared so the permission
//! prompt can read its answer from the same stream as the command loop.

use crate::AppResult;

use std::{
    io::{BufRead, stdin},
    sync::Arc,
};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Buffered lines not yet consumed by the app.
const INPUT_CHANNEL_CAPACITY: usize = 32;

/// Receiver end of the line channel, shared by the command loop and the
/// permission prompt.
pub type SharedInput = Arc<Mutex<mpsc::Receiver<String>>>;

/// Start forwarding stdin lines.
///
/// The reader thread is detached. It exits at end of input or when the
/// receiver is dropped; a read blocked on the terminal does not hold up
/// process exit.
pub fn spawn_stdin_reader() -> AppResult<SharedInput> {
    let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);

    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || forward_lines(stdin().lock(), &tx))?;

    Ok(Arc::new(Mutex::new(rx)))
}

/// Forward every line of `reader` to `tx` until either side closes.
///
/// Returns the number of lines delivered.
pub fn forward_lines<R: BufRead>(reader: R, tx: &mpsc::Sender<String>) -> usize {
    let mut forwarded = 0;

    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.blocking_send(line).is_err() {
                    debug!("Input receiver dropped, stopping reader");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read input line");
                break;
            }
        }
    }

    debug!(forwarded, "Input stream closed");
    forwarded
}

/// Next line from the shared input, `None` at end of input.
pub async fn next_line(input: &SharedInput) -> Option<String> {
    input.lock().await.recv().await
}

use action_primitives::{ActionError, ClipboardPort};
use arboard::Clipboard;
use async_trait::async_trait;

/// System pasteboard via `arboard`. Each call opens its own handle on a
/// blocking thread.
#[derive(Debug, Default, Clone)]
pub struct SystemClipboard;

async fn with_clipboard<T, F>(op: F) -> Result<T, ActionError>
where
    T: Send + 'static,
    F: FnOnce(&mut Clipboard) -> Result<T, ActionError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut clipboard = Clipboard::new()
            .map_err(|err| ActionError::Clipboard(format!("failed to open clipboard: {err}")))?;
        op(&mut clipboard)
    })
    .await
    .map_err(|err| ActionError::Clipboard(format!("clipboard task failed: {err}")))?
}

#[async_trait]
impl ClipboardPort for SystemClipboard {
    async fn read_text(&self) -> Result<Option<String>, ActionError> {
        with_clipboard(|clipboard| match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(ActionError::Clipboard(format!("clipboard read failed: {err}"))),
        })
        .await
    }

    async fn write_text(&self, text: &str) -> Result<(), ActionError> {
        let text = text.to_string();
        with_clipboard(move |clipboard| {
            clipboard
                .set_text(text)
                .map_err(|err| ActionError::Clipboard(format!("clipboard write failed: {err}")))
        })
        .await
    }
}

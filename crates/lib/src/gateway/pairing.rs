//! Pairing slot: the latest pairing code, rendered as a QR image data URL.
//!
//! Holds at most one value. Each new pairing code overwrites the previous one; nothing expires it.

use base64::Engine;
use qrcodegen::{QrCode, QrCodeEcc};
use tokio::sync::RwLock;

/// Quiet zone around the QR symbol, in modules.
const QR_BORDER: i32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("pairing code too long for a QR symbol: {0}")]
    TooLong(#[from] qrcodegen::DataTooLong),
}

/// Single-slot store for the current pairing image, shared by the session manager (writer)
/// and the HTTP handler (reader).
#[derive(Default)]
pub struct PairingSlot {
    current: RwLock<Option<String>>,
}

impl PairingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored data URL.
    pub async fn store(&self, data_url: String) {
        *self.current.write().await = Some(data_url);
    }

    /// The stored data URL, if a pairing code has been received.
    pub async fn current(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    pub async fn is_available(&self) -> bool {
        self.current.read().await.is_some()
    }
}

/// Render a pairing code to a QR code and return it as a `data:image/svg+xml;base64,...` URL.
pub fn render_data_url(code: &str) -> Result<String, RenderError> {
    let qr = QrCode::encode_text(code, QrCodeEcc::Low)?;
    let svg = to_svg(&qr, QR_BORDER);
    let encoded = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{}", encoded))
}

/// SVG with one 1x1 path segment per dark module.
fn to_svg(qr: &QrCode, border: i32) -> String {
    let dimension = qr.size() + border * 2;
    let mut path = String::new();
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(x, y) {
                if !path.is_empty() {
                    path.push(' ');
                }
                path.push_str(&format!("M{},{}h1v1h-1z", x + border, y + border));
            }
        }
    }
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
            "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n",
            "\t<path d=\"{1}\" fill=\"#000000\"/>\n",
            "</svg>\n"
        ),
        dimension, path
    )
}

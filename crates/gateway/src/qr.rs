//! Rendering of the raw pairing challenge as a scannable PNG data URI.

use {
    anyhow::{Context, Result},
    base64::Engine,
    image::{GrayImage, Luma},
    qrcode::QrCode,
};

/// Pixels per QR module.
const MODULE_PX: u32 = 8;
/// Quiet-zone border, in modules.
const QUIET_ZONE: u32 = 4;

/// Encode `payload` as a QR code and return it as a
/// `data:image/png;base64,` URI.
pub fn qr_data_uri(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes()).context("QR encoding failed")?;

    let modules = code.to_colors();
    let width = code.width() as u32;
    let img_size = (width + QUIET_ZONE * 2) * MODULE_PX;

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));
    for y in 0..width {
        for x in 0..width {
            if modules[(y * width + x) as usize] == qrcode::Color::Dark {
                let px_x = (x + QUIET_ZONE) * MODULE_PX;
                let px_y = (y + QUIET_ZONE) * MODULE_PX;
                for dy in 0..MODULE_PX {
                    for dx in 0..MODULE_PX {
                        img.put_pixel(px_x + dx, px_y + dy, Luma([0u8]));
                    }
                }
            }
        }
    }

    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img_size,
        img_size,
        image::ExtendedColorType::L8,
    )
    .context("PNG encoding failed")?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(format!("data:image/png;base64,{b64}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_decodes_to_a_png() {
        let uri = qr_data_uri("2@AbCdEfGh,pairing-ref,key==").unwrap();
        let b64 = uri.strip_prefix("data:image/png;base64,").unwrap();
        let png = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn longer_payloads_still_render() {
        let payload = "2@".to_string() + &"x".repeat(300);
        assert!(qr_data_uri(&payload).is_ok());
    }
}

use crate::foundation::error::{MemeError, MemeResult};

/// One premultiplied RGBA8 pixel.
pub(crate) type Px = [u8; 4];

/// Porter-Duff source-over for premultiplied pixels.
pub(crate) fn over(dst: Px, src: Px) -> Px {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let keep = 255 - u16::from(sa);
            let mut out = src;
            for (o, d) in out.iter_mut().zip(dst) {
                *o = o.saturating_add(scale(d, keep));
            }
            out
        }
    }
}

/// Lay the caption layer `src` over the base frame `dst`.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> MemeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MemeError::composition(format!(
            "caption layer has {} bytes, frame has {}",
            src.len(),
            dst.len()
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let px = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&px);
    }
    Ok(())
}

/// Composite premultiplied RGBA8 onto an opaque `background` and drop alpha.
pub(crate) fn flatten_to_rgb8(src: &[u8], background: [u8; 3]) -> MemeResult<Vec<u8>> {
    if !src.len().is_multiple_of(4) {
        return Err(MemeError::composition(format!(
            "{} bytes is not a whole number of rgba8 pixels",
            src.len()
        )));
    }
    let [br, bg, bb] = background;
    Ok(src
        .chunks_exact(4)
        .flat_map(|s| {
            let [r, g, b, _] = over([br, bg, bb, 255], [s[0], s[1], s[2], s[3]]);
            [r, g, b]
        })
        .collect())
}

// x * f / 255, rounded
fn scale(x: u8, f: u16) -> u8 {
    ((u32::from(x) * u32::from(f) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;

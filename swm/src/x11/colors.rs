use swm_core::colors::{Color, ColorBuilder, Colors, Rgb8, Scheme, SchemeBuilder};
use x11rb::cookie::Cookie;
use x11rb::protocol::xproto::{AllocColorReply, Colormap, ConnectionExt};
use x11rb::rust_connection::RustConnection;

use crate::error::Result;

type AllocCookie<'a> = Cookie<'a, RustConnection, AllocColorReply>;

/// Sends every allocation before waiting for any reply.
pub(crate) fn alloc_colors(
    connection: &RustConnection,
    color_map: Colormap,
    colors: ColorBuilder,
) -> Result<Colors> {
    tracing::debug!("Allocating colors {colors:?}");
    let norm = request_scheme(connection, color_map, colors.norm)?;
    let sel = request_scheme(connection, color_map, colors.sel)?;
    Ok(Colors {
        norm: await_scheme(norm)?,
        sel: await_scheme(sel)?,
    })
}

fn request_scheme(
    connection: &RustConnection,
    color_map: Colormap,
    scheme: SchemeBuilder,
) -> Result<[AllocCookie<'_>; 3]> {
    let alloc = |rgb: Rgb8| {
        let (r, g, b) = rgb.to_rgb16();
        connection.alloc_color(color_map, r, g, b)
    };
    Ok([alloc(scheme.fg)?, alloc(scheme.bg)?, alloc(scheme.border)?])
}

fn await_scheme(cookies: [AllocCookie<'_>; 3]) -> Result<Scheme> {
    let [fg, bg, border] = cookies;
    Ok(Scheme {
        fg: Color {
            pixel: fg.reply()?.pixel,
        },
        bg: Color {
            pixel: bg.reply()?.pixel,
        },
        border: Color {
            pixel: border.reply()?.pixel,
        },
    })
}

use swm_core::config::WM_CLASS_NAME_LIMIT;
use x11rb::cookie::Cookie;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, GetGeometryReply, GetPropertyReply, QueryTreeReply, Window,
};
use x11rb::rust_connection::RustConnection;

use crate::error::Result;

pub(crate) struct QueryTreeCookie<'a> {
    pub(crate) inner: Cookie<'a, RustConnection, QueryTreeReply>,
}

impl<'a> QueryTreeCookie<'a> {
    pub(crate) fn await_children(self) -> Result<Vec<Window>> {
        Ok(self.inner.reply()?.children)
    }
}

pub(crate) struct GeometryCookie<'a> {
    pub(crate) inner: Cookie<'a, RustConnection, GetGeometryReply>,
}

impl<'a> GeometryCookie<'a> {
    /// `None` if the window is gone.
    pub(crate) fn await_geometry(self) -> Option<GetGeometryReply> {
        self.inner.reply().ok()
    }
}

pub(crate) struct ClassConvertCookie<'a> {
    pub(crate) inner: Cookie<'a, RustConnection, GetPropertyReply>,
}

impl<'a> ClassConvertCookie<'a> {
    /// Instance and class, either can be missing.
    pub(crate) fn await_class_names(
        self,
    ) -> (
        Option<heapless::String<WM_CLASS_NAME_LIMIT>>,
        Option<heapless::String<WM_CLASS_NAME_LIMIT>>,
    ) {
        self.inner.reply().map_or((None, None), |reply| {
            swm_core::state::properties::parse_class(&reply.value)
        })
    }
}

pub(crate) struct FallbackNameConvertCookie<'a> {
    pub(crate) ewmh_inner: Cookie<'a, RustConnection, GetPropertyReply>,
    pub(crate) wm_inner: Cookie<'a, RustConnection, GetPropertyReply>,
}

impl<'a> FallbackNameConvertCookie<'a> {
    /// `_NET_WM_NAME`, falling back to `WM_NAME` if that's unset.
    pub(crate) fn await_name(self) -> Option<String> {
        let ewmh = self.ewmh_inner.reply().ok().filter(|r| !r.value.is_empty());
        if let Some(ewmh) = ewmh {
            return Some(decode_text_property(ewmh.type_, &ewmh.value));
        }
        self.wm_inner
            .reply()
            .ok()
            .filter(|r| !r.value.is_empty())
            .map(|wm| decode_text_property(wm.type_, &wm.value))
    }
}

pub(crate) struct TextCookie<'a> {
    pub(crate) inner: Cookie<'a, RustConnection, GetPropertyReply>,
}

impl<'a> TextCookie<'a> {
    pub(crate) fn await_text(self) -> Option<String> {
        self.inner
            .reply()
            .ok()
            .map(|reply| decode_text_property(reply.type_, &reply.value))
    }
}

pub(crate) struct TransientConvertCookie<'a> {
    pub(crate) inner: Cookie<'a, RustConnection, GetPropertyReply>,
}

impl<'a> TransientConvertCookie<'a> {
    pub(crate) fn await_is_transient_for(self) -> Option<Window> {
        let prop = self.inner.reply().ok()?;
        if prop.value_len == 0 {
            None
        } else {
            prop.value32().and_then(|mut val| val.next())
        }
    }
}

/// Any 32 bit property, hints and atom lists.
pub(crate) struct WordsCookie<'a> {
    pub(crate) inner: Cookie<'a, RustConnection, GetPropertyReply>,
}

impl<'a> WordsCookie<'a> {
    /// `None` if the property is unset or the window is gone.
    pub(crate) fn await_words(self) -> Option<Vec<u32>> {
        let reply = self.inner.reply().ok()?;
        let words: Vec<u32> = reply.value32()?.collect();
        (!words.is_empty()).then_some(words)
    }
}

/// `STRING` properties are Latin-1, everything else is treated as utf-8.
fn decode_text_property(type_: Atom, value: &[u8]) -> String {
    let value = value.split(|b| *b == 0).next().unwrap_or_default();
    if type_ == Atom::from(AtomEnum::STRING) {
        value.iter().map(|b| char::from(*b)).collect()
    } else {
        String::from_utf8_lossy(value).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use x11rb::protocol::xproto::{Atom, AtomEnum};

    use crate::x11::cookies::decode_text_property;

    #[test]
    fn string_properties_are_latin1() {
        let string = Atom::from(AtomEnum::STRING);
        assert_eq!("caf\u{e9}", decode_text_property(string, b"caf\xe9"));
    }

    #[test]
    fn other_properties_are_utf8() {
        // Some atom that isn't STRING, like UTF8_STRING
        let utf8 = 300;
        assert_eq!("café", decode_text_property(utf8, "café".as_bytes()));
        assert_eq!("a\u{fffd}", decode_text_property(utf8, b"a\xff"));
    }

    #[test]
    fn stops_at_nul() {
        let string = Atom::from(AtomEnum::STRING);
        assert_eq!("title", decode_text_property(string, b"title\0rest"));
        assert_eq!("", decode_text_property(string, b""));
    }
}

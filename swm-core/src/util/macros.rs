/// Writes into a fixed capacity string, silently truncating on overflow.
#[macro_export]
macro_rules! format_heapless {
    ($($arg:tt)*) => {{
        let mut s = heapless::String::new();
        let _ = core::fmt::write(&mut s, format_args!($($arg)*));
        s
    }}
}

/// Copies as much of `src` as fits into a fixed capacity string without splitting a char.
#[must_use]
pub fn truncate_heapless<const N: usize>(src: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in src.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::util::macros::truncate_heapless;

    #[test]
    fn format_heapless_truncates() {
        let s: heapless::String<4> = format_heapless!("[{}]", 12345);
        assert!(s.len() <= 4);
        let s: heapless::String<8> = format_heapless!("[{}]", 3);
        assert_eq!("[3]", s.as_str());
    }

    #[test]
    fn truncate_keeps_char_boundaries() {
        let s: heapless::String<3> = truncate_heapless("aåb");
        assert_eq!("aå", s.as_str());
        let s: heapless::String<16> = truncate_heapless("title");
        assert_eq!("title", s.as_str());
    }
}

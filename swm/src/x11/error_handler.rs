use x11rb::protocol::xproto::{
    CONFIGURE_WINDOW_REQUEST, COPY_AREA_REQUEST, GRAB_BUTTON_REQUEST, GRAB_KEY_REQUEST,
    POLY_FILL_RECTANGLE_REQUEST, POLY_SEGMENT_REQUEST, POLY_TEXT8_REQUEST,
    SET_INPUT_FOCUS_REQUEST,
};
use x11rb::protocol::ErrorKind;

/// Errors that are expected when talking to clients that can disappear at any time.
/// Anything else means we did something wrong.
#[must_use]
pub(crate) fn is_expected(kind: ErrorKind, request_code: u8) -> bool {
    match kind {
        ErrorKind::Window => true,
        ErrorKind::Match => {
            request_code == SET_INPUT_FOCUS_REQUEST || request_code == CONFIGURE_WINDOW_REQUEST
        }
        ErrorKind::Drawable => matches!(
            request_code,
            POLY_TEXT8_REQUEST | POLY_FILL_RECTANGLE_REQUEST | POLY_SEGMENT_REQUEST | COPY_AREA_REQUEST
        ),
        ErrorKind::Access => {
            request_code == GRAB_BUTTON_REQUEST || request_code == GRAB_KEY_REQUEST
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use x11rb::protocol::xproto::{
        CONFIGURE_WINDOW_REQUEST, COPY_AREA_REQUEST, GRAB_KEY_REQUEST, MAP_WINDOW_REQUEST,
        SET_INPUT_FOCUS_REQUEST,
    };
    use x11rb::protocol::ErrorKind;

    use crate::x11::error_handler::is_expected;

    #[test]
    fn bad_window_is_always_expected() {
        assert!(is_expected(ErrorKind::Window, MAP_WINDOW_REQUEST));
        assert!(is_expected(ErrorKind::Window, SET_INPUT_FOCUS_REQUEST));
    }

    #[test]
    fn other_kinds_depend_on_the_request() {
        assert!(is_expected(ErrorKind::Match, SET_INPUT_FOCUS_REQUEST));
        assert!(is_expected(ErrorKind::Match, CONFIGURE_WINDOW_REQUEST));
        assert!(!is_expected(ErrorKind::Match, MAP_WINDOW_REQUEST));
        assert!(is_expected(ErrorKind::Drawable, COPY_AREA_REQUEST));
        assert!(!is_expected(ErrorKind::Drawable, CONFIGURE_WINDOW_REQUEST));
        assert!(is_expected(ErrorKind::Access, GRAB_KEY_REQUEST));
        assert!(!is_expected(ErrorKind::Access, MAP_WINDOW_REQUEST));
    }

    #[test]
    fn unknown_errors_are_fatal() {
        assert!(!is_expected(ErrorKind::Alloc, MAP_WINDOW_REQUEST));
        assert!(!is_expected(ErrorKind::Value, CONFIGURE_WINDOW_REQUEST));
    }
}

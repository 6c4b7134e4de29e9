use crate::config::{Cfg, WINDOW_MANAGER_NAME};
use crate::error::{Error, Result};
use std::path::PathBuf;

pub(crate) fn load_cfg() -> Result<Cfg> {
    let user_cfg_dir = find_cfg_dir().ok_or(Error::ConfigDirFind)?;
    let file_path = user_cfg_dir
        .join(WINDOW_MANAGER_NAME)
        .join(format!("{WINDOW_MANAGER_NAME}.toml"));
    tracing::debug!("Attempting config read at {file_path:?}");
    match std::fs::read_to_string(&file_path) {
        Ok(content) => parse_cfg(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ConfigFileFind),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn parse_cfg(content: &str) -> Result<Cfg> {
    Ok(toml::from_str(content)?)
}

fn find_cfg_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .ok()
        })
}

#[cfg(test)]
mod tests {
    use crate::colors::Rgb8;
    use crate::config::{Cfg, WINDOW_MANAGER_NAME};
    use crate::util::load_cfg::{find_cfg_dir, parse_cfg};
    use std::env;
    use std::path::PathBuf;

    #[test]
    fn will_read_environment_variables_to_find_config_falling_back() {
        env::remove_var("XDG_CONFIG_HOME");
        env::remove_var("HOME");
        assert!(find_cfg_dir().is_none());
        env::set_var("HOME", "here");
        assert_eq!(Some(PathBuf::from("here/.config")), find_cfg_dir());
        env::set_var("XDG_CONFIG_HOME", "there");
        assert_eq!(Some(PathBuf::from("there")), find_cfg_dir());
        env::remove_var("HOME");
        assert_eq!(Some(PathBuf::from("there")), find_cfg_dir());
        env::remove_var("XDG_CONFIG_HOME");
        assert!(find_cfg_dir().is_none());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Cfg::default(), parse_cfg("").unwrap());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = parse_cfg(
            r##"
            tags = ["www", "dev", "chat"]
            [sizing]
            border_width = 5
            [options]
            top_bar = false
            [colors.sel]
            fg = "#000000"
            bg = "#ffffff"
            border = "#ff0000"
            [[rules]]
            instance = "pavucontrol"
            floating = true
            "##,
        )
        .unwrap();
        let default = Cfg::default();
        assert_eq!(5, cfg.sizing.border_width);
        assert_eq!(default.sizing.snap, cfg.sizing.snap);
        assert!(!cfg.options.top_bar);
        assert!(cfg.options.show_bar);
        assert_eq!(default.colors.norm, cfg.colors.norm);
        assert_eq!(Rgb8::new(0xff, 0, 0), cfg.colors.sel.border);
        assert_eq!(0b111, cfg.tag_mask());
        assert_eq!(1, cfg.rules.len());
        assert_eq!(-1, cfg.rules[0].monitor);
        assert_eq!(Some("pavucontrol"), cfg.rules[0].instance.as_deref());
        assert_eq!(default.key_mappings, cfg.key_mappings);
        assert_eq!(default.mouse_mappings, cfg.mouse_mappings);
    }

    #[test]
    fn bad_color_is_an_error() {
        assert!(parse_cfg("[colors.norm]\nfg = \"red\"\nbg = \"#000000\"\nborder = \"#000000\"")
            .is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn example_cfg_is_same_as_default() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join(format!("{WINDOW_MANAGER_NAME}.toml"));
        let content = std::fs::read_to_string(path).unwrap();
        let cfg = parse_cfg(&content).unwrap();
        assert_eq!(Cfg::default(), cfg);
    }
}

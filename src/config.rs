use crate::demo::{DemoSettings, Variant};
use configparser::ini::Ini;
use log::{info, warn, LevelFilter};
use std::path::Path;
use std::str::FromStr;

// Window
pub const WINDOW_TITLE: &str = "quadfan";
pub const DEFAULT_CONFIG_PATH: &str = "quadfan.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub display_width: u32,
    pub display_height: u32,
    pub vsync: bool,
    pub demo: DemoSettings,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_width: 1280,
            display_height: 720,
            vsync: true,
            demo: DemoSettings::default(),
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Reads every known key, falling back to the default (with a warning) for
    /// anything missing or unparsable.
    pub fn from_ini(conf: &Ini) -> Self {
        let d = Config::default();
        Self {
            display_width: parse_or(conf, "Display", "Width", d.display_width),
            display_height: parse_or(conf, "Display", "Height", d.display_height),
            vsync: parse_or::<u8>(conf, "Display", "VSync", d.vsync as u8) != 0,
            demo: DemoSettings {
                variant: parse_or(conf, "Demo", "Variant", d.demo.variant),
                fragment_offset: parse_or(conf, "Demo", "FragmentOffset", d.demo.fragment_offset),
                target_fps: parse_or(conf, "Demo", "TargetFps", d.demo.target_fps),
                target_ratio: parse_or(conf, "Demo", "TargetRatio", d.demo.target_ratio),
                grid_cell_width: parse_or(conf, "Demo", "GridCellWidth", d.demo.grid_cell_width),
                grid_cell_height: parse_or(conf, "Demo", "GridCellHeight", d.demo.grid_cell_height),
            },
            log_level: parse_or(conf, "Logging", "Level", d.log_level),
        }
    }

    fn to_ini(&self) -> Ini {
        let mut conf = Ini::new_cs();
        conf.set("Display", "Width", Some(self.display_width.to_string()));
        conf.set("Display", "Height", Some(self.display_height.to_string()));
        conf.set("Display", "VSync", Some((self.vsync as u8).to_string()));
        conf.set("Demo", "Variant", Some(self.demo.variant.to_string()));
        conf.set("Demo", "TargetFps", Some(self.demo.target_fps.to_string()));
        conf.set("Demo", "FragmentOffset", Some(self.demo.fragment_offset.to_string()));
        conf.set("Demo", "TargetRatio", Some(self.demo.target_ratio.to_string()));
        conf.set("Demo", "GridCellWidth", Some(self.demo.grid_cell_width.to_string()));
        conf.set("Demo", "GridCellHeight", Some(self.demo.grid_cell_height.to_string()));
        conf.set("Logging", "Level", Some(self.log_level.to_string().to_lowercase()));
        conf
    }
}

fn parse_or<T: FromStr + Copy>(conf: &Ini, section: &str, key: &str, default: T) -> T {
    match conf.get(section, key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for [{}] {}; using default.", raw, section, key);
            default
        }),
        None => {
            warn!("Missing [{}] {}; using default.", section, key);
            default
        }
    }
}

/// Loads the config at `path`, writing a default file first if none exists.
/// Never fails: any problem falls back to built-in defaults.
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        info!("Config '{}' not found, creating defaults.", path.display());
        if let Err(e) = Config::default().to_ini().write(path) {
            warn!("Failed to write default config '{}': {}", path.display(), e);
        }
        return Config::default();
    }

    let mut conf = Ini::new_cs();
    match conf.load(path) {
        Ok(_) => Config::from_ini(&conf),
        Err(e) => {
            warn!("Failed to load '{}' ({}), using defaults.", path.display(), e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        let mut conf = Ini::new_cs();
        conf.read(text.to_string()).unwrap();
        Config::from_ini(&conf)
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let c = parse(
            "[Display]\nWidth=800\nHeight=600\nVSync=0\n\
             [Demo]\nVariant=Sweep\nTargetFps=30\nFragmentOffset=23\nTargetRatio=1.5\n\
             [Logging]\nLevel=debug\n",
        );
        assert_eq!((c.display_width, c.display_height, c.vsync), (800, 600, false));
        assert_eq!(c.demo.variant, Variant::Sweep);
        assert_eq!(c.demo.target_fps, 30);
        assert_eq!(c.demo.fragment_offset, 23);
        assert_eq!(c.demo.target_ratio, 1.5);
        assert_eq!(c.log_level, LevelFilter::Debug);
    }

    #[test]
    fn bad_values_fall_back_per_key() {
        let c = parse("[Demo]\nTargetFps=fast\nVariant=spinning\nGridCellWidth=0.5\n");
        assert_eq!(c.demo.target_fps, 60);
        assert_eq!(c.demo.variant, Variant::Interactive);
        assert_eq!(c.demo.grid_cell_width, 0.5);
    }

    #[test]
    fn missing_keys_fall_back_individually() {
        let c = parse("[Demo]\nGridCellHeight=0.5\n");
        let d = Config::default();
        assert_eq!(c.demo.grid_cell_height, 0.5);
        assert_eq!(c.demo.grid_cell_width, d.demo.grid_cell_width);
        assert_eq!((c.display_width, c.log_level), (d.display_width, d.log_level));
    }

    #[test]
    fn written_defaults_read_back_unchanged() {
        let text = Config::default().to_ini().writes();
        assert_eq!(parse(&text), Config::default());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = std::env::temp_dir().join(format!("quadfan-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quadfan.ini");
        let _ = std::fs::remove_file(&path);

        assert_eq!(load(&path), Config::default());
        assert!(path.exists());
        assert_eq!(load(&path), Config::default());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

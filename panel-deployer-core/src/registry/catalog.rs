//! Built-in module table

use crate::types::{ModuleDescriptor, ModulePaths};

pub const MAIN_PANEL_KEY: &str = "cockpit";

const fn split(
    key: &'static str,
    display_name: &'static str,
    icon: &'static str,
    version: &'static str,
    api: &'static str,
    panel: &'static str,
) -> ModuleDescriptor {
    ModuleDescriptor {
        key,
        display_name,
        icon,
        version,
        paths: ModulePaths::Split { api, panel },
        web_root_placement: false,
    }
}

const fn combined(
    key: &'static str,
    display_name: &'static str,
    icon: &'static str,
    version: &'static str,
    source_path: &'static str,
) -> ModuleDescriptor {
    ModuleDescriptor {
        key,
        display_name,
        icon,
        version,
        paths: ModulePaths::Combined { source_path },
        web_root_placement: false,
    }
}

pub static BUILTIN_MODULES: &[ModuleDescriptor] = &[
    ModuleDescriptor {
        key: MAIN_PANEL_KEY,
        display_name: "Cockpit Panel",
        icon: "dashboard",
        version: "3.4.0",
        paths: ModulePaths::Combined {
            source_path: "cockpit",
        },
        web_root_placement: true,
    },
    combined("branding", "Branding", "palette", "1.6.0", "panel/branding"),
    combined("support", "Support", "lifebuoy", "1.2.1", "panel/support"),
    split("webview", "WebView", "globe", "2.1.0", "api/webview", "panel/webview"),
    split(
        "webview-plex",
        "WebView (Plex)",
        "play-circle",
        "2.1.0",
        "api/webview_plex",
        "panel/webview_plex",
    ),
    split("xciptv", "XCIPTV", "tv", "5.0.2", "api/xciptv", "panel/xciptv"),
    split("tivimate", "TiviMate", "tv", "4.7.0", "api/tivimate", "panel/tivimate"),
    split(
        "smarters",
        "IPTV Smarters Pro",
        "smartphone",
        "3.1.5",
        "api/smarters",
        "panel/smarters",
    ),
    split("ibo", "IBO Player", "monitor", "2.4.0", "api/ibo", "panel/ibo"),
    split("purple", "Purple Player", "film", "1.9.3", "api/purple", "panel/purple"),
    split("duplex", "Duplex Play", "layers", "1.3.0", "api/duplex", "panel/duplex"),
    split("nanomid", "NanoMID", "box", "2.0.1", "api/nanomid", "panel/nanomid"),
    split(
        "ottnavigator",
        "OTT Navigator",
        "compass",
        "1.7.1",
        "api/ottnavigator",
        "panel/ottnavigator",
    ),
    split("maxplayer", "MAX Player", "play", "1.5.0", "api/maxplayer", "panel/maxplayer"),
    split("flixiptv", "Flix IPTV", "film", "1.4.2", "api/flixiptv", "panel/flixiptv"),
    split("smartone", "SmartOne IPTV", "tv", "1.2.0", "api/smartone", "panel/smartone"),
    split("ssiptv", "SS IPTV", "tv", "1.1.4", "api/ssiptv", "panel/ssiptv"),
    split("mytvonline", "MyTVOnline", "radio", "2.2.0", "api/mytvonline", "panel/mytvonline"),
    split("neotv", "NeoTV Pro", "zap", "1.8.0", "api/neotv", "panel/neotv"),
    split(
        "xtreamplayer",
        "Xtream Player",
        "cast",
        "1.6.3",
        "api/xtreamplayer",
        "panel/xtreamplayer",
    ),
    split("perfectplayer", "Perfect Player", "star", "1.0.4", "api/perfectplayer", "panel/perfectplayer"),
    split("hotplayer", "Hot Player", "flame", "1.3.2", "api/hotplayer", "panel/hotplayer"),
];

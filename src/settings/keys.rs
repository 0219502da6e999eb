//! Player setting keys and their typed values
//!
//! The settings store holds every value as its canonical string. The typed enums here render
//! and parse those strings so the planner can reason about values (e.g. exception strictness)
//! without the store knowing anything about them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tunable build setting owned by the host's global settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    /// Compression applied to the packaged build files
    CompressionFormat,
    /// WebAssembly exception support mode
    ExceptionSupport,
    /// Where debug symbols end up
    DebugSymbolMode,
    /// Browser-side caching of the data file
    DataCaching,
    /// Content-hash file names
    NameFilesAsHashes,
    /// Engine code stripping
    StripEngineCode,
    /// IL2CPP code generation mode
    #[serde(rename = "il2CppCodeGeneration")]
    Il2CppCodeGeneration,
    /// wasm code optimization target
    CodeOptimization,
    /// Whether the splash screen is shown
    ShowSplashScreen,
    /// Whether the engine logo is shown on the splash screen
    ShowUnityLogo,
    /// WebAssembly BigInt integration
    WebAssemblyBigInt,
    /// WebAssembly table growth
    WebAssemblyTable,
    /// The 2023 WebAssembly feature set
    #[serde(rename = "wasm2023")]
    Wasm2023,
    /// Texture compression subtarget used for the data file
    #[serde(rename = "webGLTextureSubtarget")]
    WebGlTextureSubtarget,
    /// Maximum heap size in MB
    MaximumMemorySize,
}

impl SettingKey {
    /// Every key captured by a full snapshot, in restore order.
    pub const ALL: [SettingKey; 15] = [
        SettingKey::CompressionFormat,
        SettingKey::ExceptionSupport,
        SettingKey::DebugSymbolMode,
        SettingKey::DataCaching,
        SettingKey::NameFilesAsHashes,
        SettingKey::StripEngineCode,
        SettingKey::Il2CppCodeGeneration,
        SettingKey::CodeOptimization,
        SettingKey::ShowSplashScreen,
        SettingKey::ShowUnityLogo,
        SettingKey::WebAssemblyBigInt,
        SettingKey::WebAssemblyTable,
        SettingKey::Wasm2023,
        SettingKey::WebGlTextureSubtarget,
        SettingKey::MaximumMemorySize,
    ];

    /// Stable name used in reports and the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompressionFormat => "compressionFormat",
            Self::ExceptionSupport => "exceptionSupport",
            Self::DebugSymbolMode => "debugSymbolMode",
            Self::DataCaching => "dataCaching",
            Self::NameFilesAsHashes => "nameFilesAsHashes",
            Self::StripEngineCode => "stripEngineCode",
            Self::Il2CppCodeGeneration => "il2CppCodeGeneration",
            Self::CodeOptimization => "codeOptimization",
            Self::ShowSplashScreen => "showSplashScreen",
            Self::ShowUnityLogo => "showUnityLogo",
            Self::WebAssemblyBigInt => "webAssemblyBigInt",
            Self::WebAssemblyTable => "webAssemblyTable",
            Self::Wasm2023 => "wasm2023",
            Self::WebGlTextureSubtarget => "webGLTextureSubtarget",
            Self::MaximumMemorySize => "maximumMemorySize",
        }
    }

    /// Value a fresh WebGL project starts with.
    pub fn engine_default(&self) -> &'static str {
        match self {
            Self::CompressionFormat => "Gzip",
            Self::ExceptionSupport => "ExplicitlyThrownExceptionsOnly",
            Self::DebugSymbolMode => "Off",
            Self::DataCaching | Self::StripEngineCode => "True",
            Self::ShowSplashScreen | Self::ShowUnityLogo => "True",
            Self::NameFilesAsHashes => "False",
            Self::WebAssemblyBigInt | Self::WebAssemblyTable | Self::Wasm2023 => "False",
            Self::Il2CppCodeGeneration => "OptimizeSpeed",
            Self::CodeOptimization => "RuntimeSpeed",
            Self::WebGlTextureSubtarget => "Generic",
            Self::MaximumMemorySize => "2048",
        }
    }

    /// Look a key up by its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a boolean the way the settings store spells it.
pub fn bool_value(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Declares a closed set of string-valued settings with `as_str`/`parse`.
macro_rules! setting_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Canonical string stored in the settings store
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse a canonical string; unknown values yield `None`
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

setting_enum! {
    /// Compression format of the packaged build
    CompressionFormat {
        /// No compression
        Disabled => "Disabled",
        /// gzip
        Gzip => "Gzip",
        /// Brotli
        Brotli => "Brotli",
    }
}

setting_enum! {
    /// Exception support, declared from strictest to most permissive
    ExceptionSupport {
        /// Exceptions abort
        None => "None",
        /// Only explicit `throw` is supported
        ExplicitlyThrownExceptionsOnly => "ExplicitlyThrownExceptionsOnly",
        /// Full support, no stack traces
        FullWithoutStacktrace => "FullWithoutStacktrace",
        /// Full support with stack traces
        FullWithStacktrace => "FullWithStacktrace",
    }
}

impl ExceptionSupport {
    /// Lower is stricter.
    pub fn strictness_rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::ExplicitlyThrownExceptionsOnly => 1,
            Self::FullWithoutStacktrace => 2,
            Self::FullWithStacktrace => 3,
        }
    }

    /// Whether `self` is at least as strict as `other`.
    pub fn is_at_least_as_strict_as(&self, other: ExceptionSupport) -> bool {
        self.strictness_rank() <= other.strictness_rank()
    }
}

setting_enum! {
    /// Debug symbol placement
    DebugSymbolMode {
        /// Stripped
        Off => "Off",
        /// Separate symbols file
        External => "External",
        /// Embedded in the wasm
        Embedded => "Embedded",
    }
}

setting_enum! {
    /// wasm code optimization target
    CodeOptimization {
        /// Fastest builds
        BuildTimes => "BuildTimes",
        /// Runtime speed
        RuntimeSpeed => "RuntimeSpeed",
        /// Runtime speed with LTO
        RuntimeSpeedLto => "RuntimeSpeedLTO",
        /// Disk size
        DiskSize => "DiskSize",
        /// Disk size with LTO
        DiskSizeLto => "DiskSizeLTO",
    }
}

setting_enum! {
    /// IL2CPP code generation
    Il2CppCodeGeneration {
        /// Faster runtime code
        OptimizeSpeed => "OptimizeSpeed",
        /// Smaller code
        OptimizeSize => "OptimizeSize",
    }
}

setting_enum! {
    /// Texture compression subtarget
    TextureSubtarget {
        /// Engine default
        Generic => "Generic",
        /// Desktop block compression
        Dxt => "DXT",
        /// PVRTC
        Pvrtc => "PVRTC",
        /// ETC
        Etc => "ETC",
        /// ETC2
        Etc2 => "ETC2",
        /// ASTC, used by mobile GPUs
        Astc => "ASTC",
    }
}

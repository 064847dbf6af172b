use clap::{ArgAction, Args};
use swfplace_tags::{
    amf3::serde::{ExternalForm, SerializerOptions},
    CodecOptions, OpaquePolicy, PlaceCodec, Version,
};

/// Configures the verbosity of the builtin logger.
#[derive(Clone, Copy, Debug, Args)]
pub struct Verbosity {
    /// Configures the log verbosity of swfplace.
    ///
    /// `-v` is Debug, `-vv` is Trace.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Verbosity {
    /// Configures the global logger based on the settings.
    pub fn setup(self) {
        let level = self.log_level();
        simple_logger::init_with_level(level).unwrap();
    }

    fn log_level(self) -> log::Level {
        match self.verbose {
            0 => log::Level::Info,
            1 => log::Level::Debug,
            _ => log::Level::Trace,
        }
    }
}

/// Arguments describing where a record body comes from and how it
/// is interpreted.
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Path to a file holding a record body without its tag header.
    ///
    /// Use `-` to read from stdin.
    pub input: String,

    /// The PlaceObject revision of the record.
    #[clap(short, long, value_parser = clap::value_parser!(u8).range(2..=4))]
    pub record_version: u8,

    /// The version of the SWF file the record was taken from.
    #[clap(short, long, default_value_t = 19)]
    pub swf_version: u8,

    /// Additional externalizable classes whose state is one nested
    /// AMF3 value.
    #[clap(long = "external", value_name = "CLASS")]
    pub externals: Vec<String>,
}

impl RecordArgs {
    /// Gets the record revision selected on the command line.
    pub fn version(&self) -> eyre::Result<Version> {
        Ok(Version::try_from(self.record_version)?)
    }

    /// Builds a codec from the arguments.
    pub fn codec(&self, opaque_policy: OpaquePolicy) -> PlaceCodec {
        let mut amf = SerializerOptions::default();
        for class in &self.externals {
            amf.externals.register(class.as_str(), ExternalForm::WrappedValue);
        }

        PlaceCodec::new(CodecOptions {
            swf_version: self.swf_version,
            opaque_policy,
            amf,
        })
    }
}

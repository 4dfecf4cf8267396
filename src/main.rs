mod ui;

use clap::Parser;
use sniff2img::config::{self, ImageConfig, MalformedPolicy, MarkerRule};
use sniff2img::transcoder;
use sniff2img::transcoder::store::{ArtifactFormat, NpyDtype};
use std::path::PathBuf;
use std::process::ExitCode;
use ui::output;

/// sniff2img turns packet hex dumps into image datasets for intrusion detection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hex dump (tcpdump -X style) to transcode
    #[arg(short = 'f', long, value_parser)]
    file: PathBuf,

    /// Where to write the dataset (.npy, or .json)
    #[arg(short = 'o', long, value_parser, required_unless_present = "metaonly")]
    output: Option<PathBuf>,

    /// Number of packets to rasterize; fewer in the dump is an error
    #[arg(short = 'n', long, default_value_t = config::DEFAULT_PACKET_COUNT, value_parser)]
    packet_count: usize,

    /// Pixel columns per packet image
    #[arg(long, default_value_t = config::DEFAULT_COLS, value_parser)]
    cols: usize,

    /// MTU used to derive image rows, rows = ceil(mtu / cols)
    #[arg(long, default_value_t = config::DEFAULT_MTU, value_parser)]
    mtu: usize,

    /// Value for pixels past the end of a packet
    #[arg(long, default_value_t = config::DEFAULT_PADDING, value_parser)]
    padding_value: u8,

    /// Which lines start a new packet
    #[arg(long, value_enum, default_value_t = MarkerRule::Substring)]
    marker: MarkerRule,

    /// What to do with pixels that are not valid hex
    #[arg(long, value_enum, default_value_t = MalformedPolicy::Pad)]
    on_malformed: MalformedPolicy,

    /// Line separator of the dump, default is any newline
    #[arg(long, value_parser)]
    separator: Option<String>,

    /// Artifact format, default is inferred from the output extension
    #[arg(long, value_enum)]
    format: Option<ArtifactFormat>,

    /// Element type of .npy artifacts
    #[arg(long, value_enum, default_value_t = NpyDtype::U8)]
    dtype: NpyDtype,

    /// Only list the packets found in the dump, write nothing
    #[arg(short = 'm', long)]
    metaonly: bool,

    /// Display output as formatted JSON
    #[arg(short = 'j', long)]
    json: bool,
}

impl Args {
    fn image_config(&self) -> sniff2img::Result<ImageConfig> {
        ImageConfig::builder()
            .cols(self.cols)
            .mtu(self.mtu)
            .packet_count(self.packet_count)
            .padding_value(self.padding_value)
            .marker(self.marker)
            .on_malformed(self.on_malformed)
            .separator(self.separator.as_ref().map(|s| unescape(s)))
            .build()
    }
}

/// Lets `--separator '\r\n'` be typed on a shell.
fn unescape(raw: &str) -> String {
    raw.replace("\\r", "\r").replace("\\n", "\n").replace("\\t", "\t")
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.image_config()?;

    if args.metaonly {
        let survey = transcoder::core::survey(&args.file, &config)?;
        if args.json {
            println!("{}", output::data_as_json(&survey)?);
        } else {
            output::print_survey(&survey);
        }
        return Ok(());
    }

    let Some(out) = args.output.as_deref() else {
        return Err("no output path given".into());
    };

    let summary = transcoder::core::run(&args.file, out, &config, args.format, args.dtype)?;

    // ---- Output ----
    if args.json {
        println!("{}", output::data_as_json(&summary)?);
    } else {
        output::print_results(&summary);
    }

    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = simple_logger::init_with_env() {
        eprintln!("Could not set up logging: {e}");
    }

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

use ansi_term::Colour;
use serde::Serialize;
use sniff2img::transcoder::core::{BuildSummary, Survey};

pub fn print_results(summary: &BuildSummary) {
    println!("\n\u{250F}\u{2501}\u{2501}\u{2501}\u{2501} Results");
    print_core(summary);
    println!(
        "\u{2517} {} packets rasterized, {} malformed pixels",
        summary.packets_rasterized,
        malformed_colour(summary.malformed_pixels).paint(summary.malformed_pixels.to_string())
    );
}

pub fn print_core(summary: &BuildSummary) {
    println!("\u{2503}");
    println!("\u{2503} Input            : {}", Colour::Fixed(226).paint(summary.input.display().to_string()));
    println!("\u{2503} Output           : {}", Colour::Fixed(226).paint(summary.output.display().to_string()));
    println!("\u{2503} Packets found    : {}", Colour::Fixed(226).paint(summary.packets_found.to_string()));
    println!("\u{2503} Image            : {} x {}", summary.config.rows(), summary.config.cols());
    println!("\u{2503} Dataset shape    : {} x {}", Colour::Red.paint(summary.rows.to_string()), Colour::Red.paint(summary.width.to_string()));
    println!("\u{2503} MD5              : {}", summary.fingerprint);
    println!("\u{2503} ");
}

pub fn print_survey(survey: &Survey) {
    println!("\n\u{250F}\u{2501}\u{2501}\u{2501}\u{2501} Dump");
    println!("\u{2503}");
    println!("\u{2503} Input            : {}", Colour::Fixed(226).paint(survey.input.display().to_string()));
    println!("\u{2503} Packets found    : {}", Colour::Fixed(226).paint(survey.packets_found.to_string()));
    println!("\u{2503} Odd-length       : {}", malformed_colour(survey.odd_payloads).paint(survey.odd_payloads.to_string()));
    println!("\u{2503} ");
    for (index, digits) in survey.payload_digits.iter().enumerate() {
        println!("\u{2503} {:>6} : {:>5} bytes", index, digits / 2);
    }
    println!("\u{2517}");
}

fn malformed_colour(count: usize) -> Colour {
    if count == 0 {
        Colour::Green
    } else {
        Colour::Fixed(208)
    }
}

pub fn data_as_json<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

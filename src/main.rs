//! # hibinote CLI
//!
//! Usage:
//!   hibinote request.json -o booklet.pdf --font fonts/NotoSansJP-Regular.ttf
//!   echo '{ ... }' | hibinote -o booklet.pdf
//!   hibinote --example > request.json
//!
//! Photo URLs in the request are fetched over HTTP; data URIs embed as-is.
//! Set RUST_LOG=warn to see which photos were skipped.

use std::env;
use std::fs;
use std::io::{self, Read};

use hibinote::{BookletFont, HttpPhotoFetcher};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_request_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "booklet.pdf".to_string());

    // The embedded face must cover Japanese; Noto Sans JP is the default.
    let font_path = args
        .windows(2)
        .find(|w| w[0] == "--font")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "fonts/NotoSansJP-Regular.ttf".to_string());
    let font_bytes = fs::read(&font_path).expect("Failed to read font file");
    let font = match BookletFont::from_bytes(font_bytes) {
        Ok(font) => font,
        Err(e) => {
            eprintln!("✗ Unusable font {}: {}", font_path, e);
            std::process::exit(1);
        }
    };

    let fetcher = match HttpPhotoFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("✗ Failed to set up photo fetching: {}", e);
            std::process::exit(1);
        }
    };

    // Generate
    match hibinote::generate_json(&input, &font, &fetcher) {
        Ok(pdf_bytes) => {
            fs::write(&output_path, &pdf_bytes).expect("Failed to write PDF");
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_request_json() -> &'static str {
    r##"{
  "theme": "natural",
  "childName": "ゆき",
  "birthday": "2024-01-15",
  "startDate": "2024-03-01",
  "endDate": "2024-03-04",
  "diaries": [
    {
      "date": "2024-03-01",
      "content": "はじめての公園。芝生の上でしばらくきょろきょろしていた。\n帰り道はずっと寝ていた。",
      "photoUrls": [
        "https://photos.example.com/yuki/2024-03-01-park.jpg",
        "https://photos.example.com/yuki/2024-03-01-nap.jpg"
      ]
    },
    {
      "date": "2024-03-02",
      "content": "離乳食のにんじんが気に入った様子。スプーンを自分で持ちたがる。",
      "photoUrls": []
    },
    {
      "date": "2024-03-04",
      "content": "",
      "photoUrls": [
        "https://photos.example.com/yuki/2024-03-04-bath.jpg"
      ]
    }
  ],
  "events": [
    { "recordedAt": "2024-03-01T07:30:00", "type": "milk", "value": { "amountMl": 140 } },
    { "recordedAt": "2024-03-01T09:10:00", "type": "sleep", "value": { "state": "asleep" } },
    { "recordedAt": "2024-03-01T10:40:00", "type": "sleep", "value": { "state": "awake" } },
    { "recordedAt": "2024-03-01T12:00:00", "type": "breast", "value": { "leftMinutes": 10, "rightMinutes": 8 } },
    { "recordedAt": "2024-03-01T16:00:00", "type": "walk", "memo": "公園までさんぽ" },
    { "recordedAt": "2024-03-01T18:30:00", "type": "bath" },
    { "recordedAt": "2024-03-02T08:05:00", "type": "poop" },
    { "recordedAt": "2024-03-02T12:15:00", "type": "baby_food", "memo": "にんじん" },
    { "recordedAt": "2024-03-02T15:00:00", "type": "temperature", "value": { "celsius": 36.8 } },
    { "recordedAt": "2024-03-03T09:00:00", "type": "medicine" },
    { "recordedAt": "2024-03-03T14:00:00", "type": "condition", "value": { "kind": "cough" }, "memo": "軽いせき、様子見" },
    { "recordedAt": "2024-03-04T07:45:00", "type": "milk", "value": { "amountMl": 160 } }
  ],
  "coverPhoto": "https://photos.example.com/yuki/cover-round.png",
  "includeText": true,
  "includeTimeline": true,
  "pageSize": "a4"
}"##
}

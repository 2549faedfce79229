use moteus_protocol::{parse_query_result, CanFrame};

use crate::cmd::DecodeArgs;
use crate::exit::{protocol_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_query_result, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex.concat())?;
    let frame = CanFrame::from_slice(&bytes).map_err(|err| protocol_error("invalid reply", err))?;
    let result = parse_query_result(frame.as_bytes());
    print_query_result(&result, format);
    Ok(SUCCESS)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            DATA_INVALID,
            "hex payload has an odd number of digits",
        ));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).unwrap_or("??");
            u8::from_str_radix(text, 16)
                .map_err(|_| CliError::new(DATA_INVALID, format!("invalid hex byte: {text}")))
        })
        .collect()
}

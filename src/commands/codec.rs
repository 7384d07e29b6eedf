//! Offline packet tools: nothing here touches a bus

use super::CommandResult;
use can_counter::RobotConfig;
use counter_transport::protocol::{
    frame_id as build_frame_id, split_frame_id, DEVICE_TYPE_MISCELLANEOUS, MANUFACTURER_TEAM_USE,
};
use counter_transport::{api, encode_counter_command, try_parse_packet, ParsedPacket};

use crate::cli::MonitorFormat;

/// Show the API id for a class/index pair
pub fn api_id(class: u16, index: u16) -> CommandResult {
    let id = counter_transport::api_id(class, index);
    println!(
        "class {} index {} -> API id 0x{:03X} ({})",
        class,
        index,
        id,
        api::name(id)
    );
    if index > 0x0F {
        println!("  note: index {} carries into the class bits", index);
    }
    Ok(())
}

/// Show the 29-bit frame ids of the counter packets
pub fn frame_id(config: &RobotConfig, device: Option<u8>, api_filter: Option<u16>) -> CommandResult {
    let device_number = device.unwrap_or(config.device_number);
    let ids = match api_filter {
        Some(id) => vec![id],
        None => vec![api::COUNTER_CONTROL, api::COUNTER_COUNT],
    };

    println!(
        "Device type {} manufacturer {} device number {}",
        DEVICE_TYPE_MISCELLANEOUS, MANUFACTURER_TEAM_USE, device_number
    );
    for id in ids {
        let frame = build_frame_id(
            DEVICE_TYPE_MISCELLANEOUS,
            MANUFACTURER_TEAM_USE,
            id,
            device_number,
        );
        let parts = split_frame_id(frame);
        println!(
            "  {:<16} API 0x{:03X} -> frame 0x{:08X} (api field 0x{:03X})",
            api::name(id),
            id,
            frame,
            parts.api_id
        );
    }
    Ok(())
}

/// Encode a control packet and print its bytes
pub fn encode(enabled: bool, button_a: bool, button_b: bool, speed: u8) -> CommandResult {
    let bytes = encode_counter_command(enabled, button_a, button_b, speed);
    println!("{:02x} {:02x}", bytes[0], bytes[1]);
    println!(
        "  speed {} flags 0b{:03b} (enabled={} button_b={} button_a={})",
        bytes[0], bytes[1], enabled, button_b, button_a
    );
    Ok(())
}

/// Decode a payload for an API id
pub fn decode(api_filter: Option<u16>, bytes: &[u8], format: MonitorFormat) -> CommandResult {
    let id = api_filter.unwrap_or(api::COUNTER_COUNT);
    let parsed = try_parse_packet(id, bytes);

    match format {
        MonitorFormat::Json => println!("{}", serde_json::to_string(&parsed)?),
        MonitorFormat::Text => match &parsed {
            ParsedPacket::CounterCount { count } => {
                println!("COUNTER_COUNT count={} ({:#x})", count, count)
            }
            ParsedPacket::CounterControl(cmd) => println!(
                "COUNTER_CONTROL enabled={} button_a={} button_b={} speed={}",
                cmd.enabled, cmd.button_a, cmd.button_b, cmd.speed
            ),
            ParsedPacket::Unknown { api_id, data } => {
                println!("UNKNOWN API 0x{:03X}: {:02x?}", api_id, data)
            }
            ParsedPacket::Malformed { .. } | ParsedPacket::Invalid { .. } => {}
        },
    }

    match parsed {
        ParsedPacket::Malformed { api_id, error } => {
            anyhow::bail!("malformed packet for API 0x{:03X}: {}", api_id, error)
        }
        ParsedPacket::Invalid { api_id, error } => {
            anyhow::bail!("invalid packet for API 0x{:03X}: {}", api_id, error)
        }
        _ => Ok(()),
    }
}

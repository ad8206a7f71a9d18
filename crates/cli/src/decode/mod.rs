use anyhow::{Context, Result};
use engine::{run_lanes, CodecInfo, Decoded, LaneConfig, PluginManager, StopReason};
use serde_json::json;

use crate::args::{CodecsArgs, DecodeArgs};
use crate::config::Config;
use crate::output::{dim, name, print_json, print_tag};

fn join_or_dash<T>(items: &[T], fmt: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.iter().map(fmt).collect::<Vec<_>>().join(",")
    }
}

pub fn show_codecs(manager: &PluginManager, args: &CodecsArgs, cfg: &Config) -> Result<()> {
    let codecs = manager.codecs();
    let link_type = args.link_type.unwrap_or(cfg.decode.link_type);
    let grinder = codecs
        .elect_grinder(link_type)
        .ok()
        .map(|slot| slot.index() as u8);
    let instances = codecs.instances();

    if args.json {
        let grinder_name = instances
            .iter()
            .find(|i| Some(i.slot) == grinder)
            .map(|i| i.name.as_str());
        return print_json(&json!({
            "link_type": link_type,
            "grinder": grinder_name,
            "codecs": instances,
        }));
    }

    println!("slot  {:<10} {:>3}  {:<24} link types", "name", "ver", "protocol ids");
    for CodecInfo {
        slot,
        name: codec,
        version,
        protocol_ids,
        link_types,
    } in &instances
    {
        let mark = if Some(*slot) == grinder { '*' } else { ' ' };
        let pad = " ".repeat(10usize.saturating_sub(codec.len()));
        println!(
            "{mark}{slot:>3}  {}{pad} {version:>3}  {:<24} {}",
            name(codec),
            join_or_dash(protocol_ids, |id| format!("{id:#06x}")),
            join_or_dash(link_types, |lt| lt.to_string()),
        );
    }
    match grinder {
        Some(_) => print_tag(
            "CODECS",
            &format!("{} live, * decodes link type {link_type}", instances.len()),
        ),
        None => print_tag("CODECS", &format!("no codec decodes link type {link_type}")),
    }
    Ok(())
}

fn describe(stop: StopReason) -> String {
    match stop {
        StopReason::Finished => "end of chain".to_string(),
        StopReason::Unclaimed(id) => format!("no codec for protocol {id:#06x}"),
        StopReason::DecodeFailed => "decode failed".to_string(),
        StopReason::MaxLayers => "layer limit reached".to_string(),
    }
}

fn print_frame(index: usize, len: usize, decoded: &Decoded<'_>) {
    println!("frame {index} ({len} bytes)");
    for layer in &decoded.layers {
        println!(
            "  {:>4}  {} {}",
            layer.offset,
            name(layer.codec),
            dim(&format!("{} bytes", layer.len))
        );
    }
    println!(
        "  {:>4}  payload {} bytes, {}",
        decoded.payload_offset,
        len - decoded.payload_offset,
        describe(decoded.stop)
    );
}

pub fn run_decode(manager: &PluginManager, args: &DecodeArgs, cfg: &Config) -> Result<()> {
    let lanes = args
        .lanes
        .unwrap_or(cfg.decode.lanes)
        .clamp(1, args.frames.len().max(1));
    let config = LaneConfig {
        lanes,
        link_type: args.link_type.unwrap_or(cfg.decode.link_type),
        num_layers: args.layers.unwrap_or(cfg.decode.num_layers),
    };
    let decoded =
        run_lanes(manager, &config, &args.frames[..]).context("failed to run decode lanes")?;
    let totals = manager.codecs().totals();

    if args.json {
        return print_json(&json!({
            "lanes": lanes,
            "frames": decoded,
            "stats": totals,
        }));
    }

    for (i, (frame, d)) in args.frames.iter().zip(&decoded).enumerate() {
        print_frame(i, frame.0.len(), d);
    }
    let by_codec = totals
        .by_codec
        .iter()
        .map(|(codec, n)| format!("{codec}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    print_tag(
        "DECODE",
        &format!(
            "{} frames, {} layers, {} unclaimed, {} failed, {} truncated on {lanes} lane(s)",
            totals.frames, totals.layers, totals.unclaimed, totals.failed, totals.depth_exceeded
        ),
    );
    if !by_codec.is_empty() {
        print_tag("DECODE", &by_codec);
    }
    Ok(())
}

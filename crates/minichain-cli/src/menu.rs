//! Text menu and scripted demo over a [`Chain`].
use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use minichain_core::{Block, Chain, ChainError};
use serde::Serialize;
use serde_json::Value;

const RULE_WIDTH: usize = 70;
const SHORT_HASH: usize = 16;

/// Payload of blocks added from the menu.
#[derive(Serialize, Debug)]
struct Transfer<'a> {
    from: &'a str,
    to: &'a str,
    amount: f64,
}

enum Flow {
    Continue,
    Exit,
}

pub fn run<R: BufRead, W: Write>(
    chain: &mut Chain,
    difficulty: u32,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Mini Blockchain Demo (Interactive Mode)")?;
    writeln!(out, "---------------------------------------")?;
    writeln!(
        out,
        "Blockchain initialized with Genesis Block (difficulty={})",
        chain.config().genesis_difficulty
    )?;

    loop {
        writeln!(out, "\nMenu:")?;
        writeln!(out, "1. Add new block")?;
        writeln!(out, "2. View blockchain")?;
        writeln!(out, "3. Validate chain")?;
        writeln!(out, "4. Tamper with a block")?;
        writeln!(out, "5. Exit")?;

        let Some(choice) = prompt(input, out, "\nEnter your choice (1-5): ")? else {
            break;
        };
        let flow = match choice.as_str() {
            "1" => add_block(chain, difficulty, input, out)?,
            "2" => {
                print_chain(chain, out)?;
                Flow::Continue
            }
            "3" => {
                writeln!(out, "\nChecking blockchain validity...")?;
                print_validation(chain, out)?;
                Flow::Continue
            }
            "4" => tamper(chain, input, out)?,
            "5" => Flow::Exit,
            _ => {
                writeln!(out, "Invalid option. Please enter a number between 1 and 5.")?;
                Flow::Continue
            }
        };
        if let Flow::Exit = flow {
            break;
        }
    }

    writeln!(out, "\nExiting... Thank you for exploring the mini blockchain!")?;
    Ok(())
}

/// Mine `blocks` transfers, validate, forge block 1, validate again.
pub fn run_demo<W: Write>(
    chain: &mut Chain,
    difficulty: u32,
    blocks: usize,
    out: &mut W,
) -> Result<()> {
    let names = ["alice", "bob", "carol", "dave"];
    for i in 0..blocks {
        let transfer = Transfer {
            from: names[i % names.len()],
            to: names[(i + 1) % names.len()],
            amount: (i + 1) as f64 * 10.0,
        };
        mine(chain, serde_json::to_string(&transfer)?, difficulty, out)?;
    }
    print_validation(chain, out)?;

    if chain.len() > 1 {
        chain.tamper(1, "forged")?;
        writeln!(out, "Block #1 modified without re-mining.")?;
        print_validation(chain, out)?;
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn add_block<R: BufRead, W: Write>(
    chain: &mut Chain,
    difficulty: u32,
    input: &mut R,
    out: &mut W,
) -> Result<Flow> {
    let Some(from) = prompt(input, out, "Enter sender name: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(to) = prompt(input, out, "Enter receiver name: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(amount) = prompt(input, out, "Enter amount: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(amount) = amount.parse::<f64>().ok().filter(|a| a.is_finite()) else {
        writeln!(out, "Please enter a valid amount.")?;
        return Ok(Flow::Continue);
    };

    let data = serde_json::to_string(&Transfer {
        from: &from,
        to: &to,
        amount,
    })?;
    writeln!(out, "Mining new block...")?;
    mine(chain, data, difficulty, out)?;
    Ok(Flow::Continue)
}

/// Mining failures are reported, not propagated.
fn mine<W: Write>(chain: &mut Chain, data: String, difficulty: u32, out: &mut W) -> Result<()> {
    match chain.add_block(data, difficulty) {
        Ok(mined) => writeln!(
            out,
            "Mined block #{} in {:.3}s  hash={}...  nonce={}",
            mined.index,
            mined.elapsed_seconds(),
            &mined.hash[..SHORT_HASH],
            mined.nonce
        )?,
        Err(err) => writeln!(out, "Mining failed: {err}")?,
    }
    Ok(())
}

fn tamper<R: BufRead, W: Write>(chain: &mut Chain, input: &mut R, out: &mut W) -> Result<Flow> {
    let Some(index) = prompt(input, out, "Enter block index to tamper (e.g. 1): ")? else {
        return Ok(Flow::Exit);
    };
    let Ok(index) = index.parse::<usize>() else {
        writeln!(out, "Please enter a valid number.")?;
        return Ok(Flow::Continue);
    };
    let current = match chain.block(index) {
        Ok(block) => block.data.clone(),
        Err(err) => {
            writeln!(out, "Invalid block index: {err}")?;
            return Ok(Flow::Continue);
        }
    };
    let Some(field) = prompt(
        input,
        out,
        "Enter field to modify (e.g. amount/from/to, empty for the whole payload): ",
    )?
    else {
        return Ok(Flow::Exit);
    };
    let Some(value) = prompt(input, out, "Enter new value: ")? else {
        return Ok(Flow::Exit);
    };

    let Some(forged) = forge_payload(&current, &field, &value) else {
        writeln!(out, "Invalid field name.")?;
        return Ok(Flow::Continue);
    };
    match chain.tamper(index, forged) {
        Ok(()) => writeln!(
            out,
            "Block #{index} modified! Re-run validation to check results."
        )?,
        Err(ChainError::IndexOutOfRange { .. }) => writeln!(out, "Invalid block index.")?,
        Err(err) => return Err(err.into()),
    }
    Ok(Flow::Continue)
}

/// Replace one field of a JSON object payload, or the whole payload when
/// `field` is empty. `None` when the field does not exist.
fn forge_payload(current: &str, field: &str, value: &str) -> Option<String> {
    if field.is_empty() {
        return Some(value.to_string());
    }
    let mut payload: Value = serde_json::from_str(current).ok()?;
    let slot = payload.get_mut(field)?;
    *slot = Value::String(value.to_string());
    Some(payload.to_string())
}

fn print_chain<W: Write>(chain: &Chain, out: &mut W) -> Result<()> {
    for block in chain.blocks() {
        writeln!(out, "\n{}", "-".repeat(RULE_WIDTH))?;
        print_block(block, out)?;
    }
    writeln!(out, "\n{}", "-".repeat(RULE_WIDTH))?;
    Ok(())
}

fn print_block<W: Write>(block: &Block, out: &mut W) -> Result<()> {
    writeln!(out, "Block #{}", block.index)?;
    writeln!(out, "  time:          {}", format_timestamp(block.timestamp))?;
    writeln!(out, "  prev_hash:     {}", block.previous_hash)?;
    writeln!(out, "  nonce:         {}", block.nonce)?;
    writeln!(out, "  difficulty:    {}", block.difficulty)?;
    writeln!(out, "  hash:          {}", block.hash)?;
    let data = match serde_json::from_str::<Value>(&block.data) {
        Ok(json @ Value::Object(_)) => serde_json::to_string_pretty(&json)?,
        _ => block.data.clone(),
    };
    writeln!(out, "  data:          {data}")?;
    Ok(())
}

fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    let nanos = (timestamp.fract() * 1e9) as u32;
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("{timestamp}"),
    }
}

fn print_validation<W: Write>(chain: &Chain, out: &mut W) -> Result<()> {
    if chain.validate().is_valid {
        writeln!(out, "The blockchain is valid.")?;
        return Ok(());
    }
    writeln!(out, "Blockchain integrity has been broken!")?;
    for violation in chain.violations() {
        writeln!(out, "  {violation}")?;
    }
    Ok(())
}

/// Print the addresses a set of well-known test mnemonics derive to
use anyhow::Result;
use cosmos_wallet::chain::wallet::{KeyPair, DEFAULT_HD_PATH};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let prefix = args.first().map(String::as_str).unwrap_or("cosmos");
    let hd_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_HD_PATH);

    println!("=== Deriving test addresses ({} at {}) ===\n", prefix, hd_path);

    let test_wallets = vec![
        ("Wallet-1", "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"),
        ("Wallet-2", "test test test test test test test test test test test junk"),
        ("Wallet-3", "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong"),
        ("Wallet-4", "forward service profit benefit punch catch fan chief jealous steel harvest column spell rude warm home melody hat broccoli pulse say garlic you firm"),
    ];

    for (name, mnemonic) in test_wallets {
        match KeyPair::derive(mnemonic, "", hd_path).and_then(|keys| keys.address(prefix)) {
            Ok(address) => {
                println!("{}: {}", name, address);
            }
            Err(e) => {
                println!("{}: ERROR - {}", name, e);
            }
        }
    }

    println!("\n# Usage: derive_addresses [prefix] [hd_path]");
    println!("# e.g.   derive_addresses desmos \"m/44'/852'/0'/0/0\"");

    Ok(())
}

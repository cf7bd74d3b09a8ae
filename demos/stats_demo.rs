use clap::Parser;
use quadprobe::Handle;
use quadprobe::Table;
use quadprobe::prime::next_prime;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    /// Initial capacity; rounded up to the next prime.
    #[arg(short = 'c', long = "capacity", default_value_t = 7)]
    capacity: usize,

    /// Number of entries to insert.
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    /// Fraction of inserted entries to remove afterwards.
    #[arg(short = 'r', long = "remove_ratio", default_value_t = 0.25)]
    remove_ratio: f64,

    /// Print every slot after filling the table.
    #[arg(long = "dump")]
    dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let capacity = next_prime(args.capacity).ok_or("capacity too large")?;
    println!("Creating Table with capacity: {capacity}");

    let payloads: Vec<u64> = (0..args.entries as u64).collect();
    let mut table = Table::new(capacity)?;

    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let mut keys = Vec::with_capacity(payloads.len());
    let mut duplicates = 0;
    for payload in &payloads {
        let key = rng.random_range(1..=u32::MAX);
        match table.insert(key, Handle::from_ref(payload)) {
            Ok(()) => keys.push(key),
            Err(_) => duplicates += 1,
        }
    }

    println!(
        "Inserted {} entries ({} duplicate keys skipped), capacity now {}",
        table.len(),
        duplicates,
        table.capacity()
    );

    let removals = (keys.len() as f64 * args.remove_ratio) as usize;
    for key in keys.iter().take(removals) {
        table.remove(*key)?;
    }
    println!("Removed {removals} entries");

    if args.dump {
        table.print(|payload, f| {
            // SAFETY: `payloads` outlives the table.
            write!(f, "{}", unsafe { Handle::<u64>::as_ref(*payload) })
        });
    }

    table.stats().print();
    Ok(())
}

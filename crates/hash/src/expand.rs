// Copyright 2024 Irreducible Inc.

use digest::Digest;
use p3_field::PrimeField32;
use vortex_math::KoalaBear;

/// Deterministically expands `(domain, seed)` into `len` uniformly distributed field elements.
///
/// The hash is run in counter mode: block `c` is `H(domain || seed || c)`, read as
/// little-endian 32-bit words. Words are masked to 31 bits and rejected when they are not
/// canonical, so the output is unbiased.
pub fn expand_seed<H: Digest>(domain: &[u8], seed: u64, len: usize) -> Vec<KoalaBear> {
	let mut out = Vec::with_capacity(len);
	let mut counter = 0u64;
	while out.len() < len {
		let block = H::new()
			.chain_update(domain)
			.chain_update(seed.to_le_bytes())
			.chain_update(counter.to_le_bytes())
			.finalize();
		counter += 1;

		for word in block.chunks_exact(4) {
			let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]) & 0x7fff_ffff;
			if word < KoalaBear::ORDER_U32 {
				out.push(KoalaBear::new(word));
				if out.len() == len {
					break;
				}
			}
		}
	}
	out
}

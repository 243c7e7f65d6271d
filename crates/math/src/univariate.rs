// Copyright 2024 Irreducible Inc.

use p3_field::{ExtensionField, Field};

/// Evaluates the polynomial with the given monomial coefficients (lowest degree first) at `x`.
pub fn evaluate_univariate<F, FE>(coeffs: &[F], x: FE) -> FE
where
	F: Field,
	FE: ExtensionField<F>,
{
	coeffs
		.iter()
		.rev()
		.fold(FE::ZERO, |acc, &coeff| acc * x + coeff)
}

#[cfg(test)]
mod tests {
	use p3_field::PrimeCharacteristicRing;
	use proptest::prelude::*;
	use rand::{rngs::StdRng, Rng, SeedableRng};

	use super::*;
	use crate::{KoalaBear, KoalaBearExt4};

	#[test]
	fn test_evaluate_univariate_matches_powers() {
		let mut rng = StdRng::seed_from_u64(0);
		let coeffs = (0..13).map(|_| rng.random()).collect::<Vec<KoalaBear>>();
		let x: KoalaBearExt4 = rng.random();

		let expected = coeffs
			.iter()
			.zip(x.powers())
			.map(|(&c, x_i)| x_i * c)
			.sum::<KoalaBearExt4>();
		assert_eq!(evaluate_univariate(&coeffs, x), expected);
		assert_eq!(evaluate_univariate::<KoalaBear, _>(&[], x), KoalaBearExt4::ZERO);
	}

	proptest! {
		#[test]
		fn test_evaluation_is_linear(seed in any::<u64>(), len in 0usize..20) {
			let mut rng = StdRng::seed_from_u64(seed);
			let a = (0..len).map(|_| rng.random()).collect::<Vec<KoalaBear>>();
			let b = (0..len).map(|_| rng.random()).collect::<Vec<KoalaBear>>();
			let x: KoalaBearExt4 = rng.random();

			let sum = a.iter().zip(&b).map(|(&a, &b)| a + b).collect::<Vec<_>>();
			prop_assert_eq!(
				evaluate_univariate(&sum, x),
				evaluate_univariate(&a, x) + evaluate_univariate(&b, x)
			);
		}
	}
}

use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// this is used to compare the reduce & map formulations of a hierarchical
// Poisson model. Both formulations describe the same observations:
// - the reduce formulation stores each count alongside its group index
// - the map formulation stores the counts grouped together
pub struct HierarchicalData {
    // for use with the reduce formulation
    y: Vec<i64>,
    gidx: Vec<usize>,
    // for use with the map formulation
    yg: Vec<Vec<i64>>,
    // shared by both formulations
    log_lambda_group: Vec<f64>,
}

impl HierarchicalData {
    /// constructs an instance from counts and (0-based) group indices
    pub fn from_observations(
        y: Vec<i64>,
        gidx: Vec<usize>,
        log_lambda_group: Vec<f64>,
    ) -> HierarchicalData {
        assert_eq!(y.len(), gidx.len());
        let n_groups = log_lambda_group.len();
        let mut yg = vec![Vec::new(); n_groups];
        for (&count, &g) in y.iter().zip(gidx.iter()) {
            assert!(g < n_groups);
            yg[g].push(count);
        }
        HierarchicalData {
            y,
            gidx,
            yg,
            log_lambda_group,
        }
    }

    /// draws `n_obs` observations spread over `n_groups` groups.
    ///
    /// The log-rates are drawn uniformly from `[-1, 2]`, and each count is
    /// drawn from the Poisson distribution of its group.
    pub fn from_random(n_groups: usize, n_obs: usize, seed: u64) -> HierarchicalData {
        assert!(n_groups > 0);
        let mut my_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let log_lambda_dist = Uniform::try_from(-1.0..=2.0).unwrap();
        let group_dist = Uniform::try_from(0..n_groups).unwrap();

        let log_lambda_group: Vec<f64> = (0..n_groups)
            .map(|_| log_lambda_dist.sample(&mut my_rng))
            .collect();

        let mut y = Vec::with_capacity(n_obs);
        let mut gidx = Vec::with_capacity(n_obs);
        for _ in 0..n_obs {
            let g = group_dist.sample(&mut my_rng);
            y.push(sample_poisson(log_lambda_group[g].exp(), &mut my_rng));
            gidx.push(g);
        }
        Self::from_observations(y, gidx, log_lambda_group)
    }

    pub fn y(&self) -> &[i64] {
        &self.y
    }

    pub fn gidx(&self) -> &[usize] {
        &self.gidx
    }

    pub fn yg(&self) -> &[Vec<i64>] {
        &self.yg
    }

    pub fn log_lambda_group(&self) -> &[f64] {
        &self.log_lambda_group
    }

    pub fn n_groups(&self) -> usize {
        self.log_lambda_group.len()
    }
}

// Knuth's multiplication method. It's slow for large rates, but our rates
// never exceed e².
fn sample_poisson(lambda: f64, rng: &mut Xoshiro256PlusPlus) -> i64 {
    let unit = Uniform::try_from(0.0..1.0).unwrap();
    let threshold = (-lambda).exp();
    let mut count = 0;
    let mut product = unit.sample(rng);
    while product > threshold {
        count += 1;
        product *= unit.sample(rng);
    }
    count
}

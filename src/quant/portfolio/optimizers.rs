//! # Portfolio Optimizers
//!
//! $$
//! \max_{\mathbf{w}\in\Delta^{n-1}} \ \sqrt{P}\,\frac{\bar r(\mathbf{w})}{\hat\sigma_r(\mathbf{w})}
//! $$
//!
//! Long-only Sharpe-ratio maximization over the probability simplex.
//!
//! The objective is the negative Sharpe ratio of the valued portfolio over the full
//! aligned range. `sum(w) = 1` and `0 <= w <= 1` are enforced by Euclidean projection
//! onto the simplex inside a spectral projected-gradient solver (Barzilai-Borwein step
//! with Armijo backtracking) run through argmin's `Executor`. The solver is local: it
//! returns the optimum reached from the starting point, not a global guarantee.

use anyhow::anyhow;
use argmin::core::CostFunction;
use argmin::core::Error;
use argmin::core::Executor;
use argmin::core::Gradient;
use argmin::core::IterState;
use argmin::core::LineSearch;
use argmin::core::OptimizationResult;
use argmin::core::Problem;
use argmin::core::Solver;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::core::KV;
use argmin::solver::linesearch::condition::ArmijoCondition;
use argmin::solver::linesearch::BacktrackingLineSearch;
use ndarray::Array2;
use ndarray::ArrayView1;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::error::PortfolioError;
use super::error::Result;
use super::returns::statistics;
use super::types::AlignedPriceTable;
use super::types::Allocation;
use super::types::OptimizationOutcome;
use super::valuation::check_investment;
use super::valuation::combine;
use super::valuation::normalize;

const ARMIJO: f64 = 1e-4;
const BACKTRACK_RATIO: f64 = 0.5;
const MAX_BACKTRACKS: u64 = 50;
const STEP_MIN: f64 = 1e-10;
const STEP_MAX: f64 = 1e10;

const LINE_SEARCH_FAILED: &str = "line search failed to find a descent step";
const NON_FINITE_GRADIENT: &str = "non-finite gradient";

type SimplexState = IterState<Vec<f64>, Vec<f64>, (), (), (), f64>;
type Backtracking = BacktrackingLineSearch<Vec<f64>, Vec<f64>, ArmijoCondition<f64>, f64>;

/// Solver limits for [`optimize_sharpe`].
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
  /// Maximum number of projected-gradient iterations.
  pub max_iters: u64,
  /// Convergence tolerance on the projected gradient and on relative objective change.
  pub tolerance: f64,
  /// Central finite-difference step for the gradient.
  pub gradient_step: f64,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      max_iters: 1000,
      tolerance: 1e-9,
      gradient_step: 1e-7,
    }
  }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn inf_norm(v: &[f64]) -> f64 {
  v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

/// Euclidean projection onto `{w : w >= 0, sum(w) = 1}`.
fn project_simplex(v: &[f64]) -> Vec<f64> {
  let mut u = v.to_vec();
  u.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

  let mut cssv = 0.0;
  let mut theta = 0.0;
  for (i, ui) in u.iter().enumerate() {
    cssv += *ui;
    let t = (cssv - 1.0) / (i as f64 + 1.0);
    if *ui - t > 0.0 {
      theta = t;
    }
  }

  v.iter().map(|x| (x - theta).max(0.0)).collect()
}

/// `P(w - step * g) - w`
fn projected_direction(w: &[f64], g: &[f64], step: f64) -> Vec<f64> {
  let trial: Vec<f64> = w.iter().zip(g).map(|(wi, gi)| wi - step * gi).collect();
  project_simplex(&trial)
    .iter()
    .zip(w)
    .map(|(p, wi)| p - wi)
    .collect()
}

/// Negative Sharpe ratio of a weight vector over a pre-normalized price matrix.
struct SharpeObjective {
  normalized: Array2<f64>,
  investment: f64,
  periods_per_year: u32,
  gradient_step: f64,
}

impl SharpeObjective {
  fn sharpe(&self, w: &[f64]) -> Result<f64> {
    let values = combine(self.normalized.view(), ArrayView1::from(w), self.investment);
    Ok(statistics(values.view(), self.periods_per_year)?.sharpe_ratio)
  }
}

impl CostFunction for SharpeObjective {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, w: &Self::Param) -> std::result::Result<Self::Output, Error> {
    // degenerate candidates are never accepted by the line search
    Ok(self.sharpe(w).map(|s| -s).unwrap_or(f64::INFINITY))
  }
}

impl Gradient for SharpeObjective {
  type Param = Vec<f64>;
  type Gradient = Vec<f64>;

  fn gradient(&self, w: &Self::Param) -> std::result::Result<Self::Gradient, Error> {
    let h = self.gradient_step;
    let mut grad = vec![0.0; w.len()];

    for i in 0..w.len() {
      let mut up = w.clone();
      let mut down = w.clone();
      up[i] += h;
      down[i] -= h;
      grad[i] = (self.cost(&up)? - self.cost(&down)?) / (2.0 * h);
    }

    Ok(grad)
  }
}

/// Spectral projected gradient on the probability simplex.
///
/// Each iteration projects a Barzilai-Borwein step onto the simplex and backtracks
/// along the resulting feasible direction until the Armijo condition holds.
#[derive(Clone)]
struct SpectralProjectedGradient {
  linesearch: Backtracking,
  tolerance: f64,
  step: f64,
}

impl SpectralProjectedGradient {
  fn new(tolerance: f64) -> std::result::Result<Self, Error> {
    let linesearch =
      BacktrackingLineSearch::new(ArmijoCondition::new(ARMIJO)?).rho(BACKTRACK_RATIO)?;
    Ok(Self {
      linesearch,
      tolerance,
      step: 1.0,
    })
  }
}

impl<O> Solver<O, SimplexState> for SpectralProjectedGradient
where
  O: CostFunction<Param = Vec<f64>, Output = f64> + Gradient<Param = Vec<f64>, Gradient = Vec<f64>>,
{
  const NAME: &'static str = "Spectral projected gradient";

  fn init(
    &mut self,
    problem: &mut Problem<O>,
    state: SimplexState,
  ) -> std::result::Result<(SimplexState, Option<KV>), Error> {
    let w = state
      .get_param()
      .cloned()
      .ok_or_else(|| anyhow!("projected gradient needs a starting allocation"))?;
    let f = problem.cost(&w)?;
    let g = problem.gradient(&w)?;
    let state = state.cost(f);

    if !f.is_finite() {
      let reason = TerminationReason::SolverExit("objective undefined at the start".into());
      return Ok((state.terminate_with(reason), None));
    }
    if g.iter().any(|x| !x.is_finite()) {
      let reason = TerminationReason::SolverExit(NON_FINITE_GRADIENT.into());
      return Ok((state.terminate_with(reason), None));
    }

    Ok((state.gradient(g), None))
  }

  fn next_iter(
    &mut self,
    problem: &mut Problem<O>,
    state: SimplexState,
  ) -> std::result::Result<(SimplexState, Option<KV>), Error> {
    let w = state
      .get_param()
      .cloned()
      .ok_or_else(|| anyhow!("projected gradient lost its allocation"))?;
    let g = state
      .get_gradient()
      .cloned()
      .ok_or_else(|| anyhow!("projected gradient lost its gradient"))?;
    let f = state.get_cost();

    let mut linesearch = self.linesearch.clone();
    linesearch.search_direction(projected_direction(&w, &g, self.step));

    let OptimizationResult {
      problem: line_problem,
      state: mut line_state,
      ..
    } = Executor::new(
      problem
        .take_problem()
        .ok_or_else(|| anyhow!("objective unavailable for the line search"))?,
      linesearch,
    )
    .configure(|ls| {
      ls.param(w.clone())
        .gradient(g.clone())
        .cost(f)
        .max_iters(MAX_BACKTRACKS)
    })
    .ctrlc(false)
    .run()?;
    problem.consume_problem(line_problem);

    if line_state.get_termination_reason() != Some(&TerminationReason::SolverConverged) {
      let pg = inf_norm(&projected_direction(&w, &g, 1.0));
      // finite-difference noise can block descent at a numerically stationary point
      let reason = if pg <= self.tolerance.sqrt() {
        debug!(pg, objective = f, "line search exhausted at a stationary point");
        TerminationReason::SolverConverged
      } else {
        debug!(pg, objective = f, "line search exhausted away from a stationary point");
        TerminationReason::SolverExit(LINE_SEARCH_FAILED.into())
      };
      return Ok((state.terminate_with(reason), None));
    }

    let candidate = line_state
      .take_param()
      .ok_or_else(|| anyhow!("line search returned no allocation"))?;
    let fc = line_state.get_cost();
    let g_new = problem.gradient(&candidate)?;

    let s: Vec<f64> = candidate.iter().zip(&w).map(|(a, b)| a - b).collect();
    let state = state.param(candidate).cost(fc);
    if g_new.iter().any(|x| !x.is_finite()) {
      let reason = TerminationReason::SolverExit(NON_FINITE_GRADIENT.into());
      return Ok((state.terminate_with(reason), None));
    }

    let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
    let sy = dot(&s, &y);
    self.step = if sy > 0.0 {
      (dot(&s, &s) / sy).clamp(STEP_MIN, STEP_MAX)
    } else {
      STEP_MAX
    };
    trace!(
      iter = state.get_iter(),
      objective = fc,
      step = self.step,
      "projected gradient step"
    );

    Ok((state.gradient(g_new), None))
  }

  fn terminate(&mut self, state: &SimplexState) -> TerminationStatus {
    if let (Some(w), Some(g)) = (state.get_param(), state.get_gradient()) {
      if inf_norm(&projected_direction(w, g, 1.0)) <= self.tolerance {
        debug!(iter = state.get_iter(), "projected gradient below tolerance");
        return TerminationStatus::Terminated(TerminationReason::SolverConverged);
      }
    }

    let (f, prev) = (state.get_cost(), state.get_prev_cost());
    if (prev - f).abs() <= self.tolerance * (1.0 + f.abs()) {
      return TerminationStatus::Terminated(TerminationReason::SolverConverged);
    }

    TerminationStatus::NotTerminated
  }
}

fn solver_error(reason: impl Into<String>, objective: f64, iterations: u64) -> PortfolioError {
  PortfolioError::Optimization {
    reason: reason.into(),
    objective,
    iterations,
  }
}

/// Minimize `problem` over the simplex from `start`.
///
/// Returns the final weights, objective and iteration count, or an
/// [`PortfolioError::Optimization`] for every termination other than convergence.
fn minimize<O>(
  problem: O,
  start: Vec<f64>,
  config: &OptimizerConfig,
) -> Result<(Vec<f64>, f64, u64)>
where
  O: CostFunction<Param = Vec<f64>, Output = f64> + Gradient<Param = Vec<f64>, Gradient = Vec<f64>>,
{
  let solver = SpectralProjectedGradient::new(config.tolerance)
    .map_err(|e| solver_error(e.to_string(), f64::NAN, 0))?;
  let mut state = Executor::new(problem, solver)
    .configure(|state| state.param(start).max_iters(config.max_iters))
    .run()
    .map_err(|e| solver_error(e.to_string(), f64::NAN, 0))?
    .state;

  let objective = state.get_cost();
  let iterations = state.get_iter();
  match state.get_termination_reason().cloned() {
    Some(TerminationReason::SolverConverged) => {
      let w = state
        .take_param()
        .ok_or_else(|| solver_error("solver returned no allocation", objective, iterations))?;
      Ok((w, objective, iterations))
    }
    Some(TerminationReason::MaxItersReached) => Err(solver_error(
      "maximum iterations reached without convergence",
      objective,
      iterations,
    )),
    Some(reason) => Err(solver_error(reason.text(), objective, iterations)),
    None => Err(solver_error("solver stopped without a reason", objective, iterations)),
  }
}

/// Uniform weights, or the best single-instrument allocation when the uniform
/// portfolio has no defined Sharpe ratio.
fn starting_point(objective: &SharpeObjective, n: usize) -> Result<Vec<f64>> {
  let uniform = Allocation::uniform(n).into_inner();
  if objective.sharpe(&uniform).is_ok() {
    return Ok(uniform);
  }

  let vertex = (0..n)
    .filter_map(|i| {
      let mut w = vec![0.0; n];
      w[i] = 1.0;
      objective.sharpe(&w).ok().map(|sharpe| (w, sharpe))
    })
    .max_by(|a, b| a.1.total_cmp(&b.1));

  match vertex {
    Some((w, sharpe)) => {
      warn!(sharpe, "uniform allocation is degenerate, starting from the best single instrument");
      Ok(w)
    }
    None => Err(solver_error(
      "no allocation with a defined Sharpe ratio to start from",
      f64::NAN,
      0,
    )),
  }
}

fn finish(w: Vec<f64>, f: f64, iterations: u64) -> Result<OptimizationOutcome> {
  let clipped: Vec<f64> = w.iter().map(|x| x.clamp(0.0, 1.0)).collect();
  let total: f64 = clipped.iter().sum();
  let weights = clipped.iter().map(|x| x / total).collect();
  let allocation =
    Allocation::new(weights).map_err(|e| solver_error(e.to_string(), f, iterations))?;

  info!(iterations, sharpe = -f, "sharpe optimization converged");
  Ok(OptimizationOutcome {
    allocation,
    sharpe_ratio: Some(-f),
    iterations,
    solver_invoked: true,
  })
}

/// Maximize the Sharpe ratio over long-only fully invested allocations.
///
/// A single-instrument table returns `[1.0]` without running the solver.
pub fn optimize_sharpe(
  table: &AlignedPriceTable,
  investment: f64,
  periods_per_year: u32,
  config: &OptimizerConfig,
) -> Result<OptimizationOutcome> {
  check_investment(investment)?;
  let n = table.n_instruments();
  let normalized = normalize(table.prices().view());

  match n {
    0 => return Err(solver_error("no instruments to allocate", f64::NAN, 0)),
    1 => {
      let sharpe_ratio = statistics(
        combine(normalized.view(), ArrayView1::from(&[1.0][..]), investment).view(),
        periods_per_year,
      )
      .ok()
      .map(|s| s.sharpe_ratio);
      return Ok(OptimizationOutcome {
        allocation: Allocation::uniform(1),
        sharpe_ratio,
        iterations: 0,
        solver_invoked: false,
      });
    }
    _ => {}
  }

  let objective = SharpeObjective {
    normalized,
    investment,
    periods_per_year,
    gradient_step: config.gradient_step,
  };

  let start = starting_point(&objective, n)?;
  let (w, f, iterations) = minimize(objective, start, config)?;
  finish(w, f, iterations)
}

/// [`optimize_sharpe`] with default solver limits, returning only the weights.
pub fn optimize(
  table: &AlignedPriceTable,
  investment: f64,
  periods_per_year: u32,
) -> Result<Allocation> {
  optimize_sharpe(table, investment, periods_per_year, &OptimizerConfig::default())
    .map(|outcome| outcome.allocation)
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use chrono::Days;
  use chrono::NaiveDate;
  use proptest::prelude::*;
  use tracing_test::traced_test;

  use super::*;
  use crate::quant::portfolio::returns::DAILY;
  use crate::quant::portfolio::returns::analyze;
  use crate::quant::portfolio::valuation::value;

  fn table(columns: &[Vec<f64>]) -> AlignedPriceTable {
    let rows = columns[0].len();
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let dates = (0..rows).map(|i| start + Days::new(i as u64)).collect();
    let prices = Array2::from_shape_fn((rows, columns.len()), |(i, j)| columns[j][i]);
    let instruments = (0..columns.len()).map(|j| format!("A{j}")).collect();
    AlignedPriceTable::new(instruments, dates, prices).unwrap()
  }

  fn path(drift: f64, amplitude: f64, freq: f64, rows: usize) -> Vec<f64> {
    (0..rows)
      .map(|t| {
        let t = t as f64;
        100.0 * (1.0 + drift).powf(t) * (1.0 + amplitude * (freq * t).sin())
      })
      .collect()
  }

  fn sharpe_of(table: &AlignedPriceTable, weights: &[f64]) -> f64 {
    let allocation = Allocation::new(weights.to_vec()).unwrap();
    let series = value(table, &allocation, 1.0, None).unwrap();
    analyze(&series, DAILY).unwrap().sharpe_ratio
  }

  #[test]
  fn projection_lands_on_simplex() {
    let p = project_simplex(&[0.9, 0.8, -0.4]);
    assert_relative_eq!(p.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(p[0], 0.55, epsilon = 1e-12);
    assert_relative_eq!(p[1], 0.45, epsilon = 1e-12);
    assert_eq!(p[2], 0.0);

    let q = project_simplex(&[0.2, 0.3, 0.5]);
    assert_relative_eq!(q[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(q[2], 0.5, epsilon = 1e-12);
  }

  #[test]
  fn single_instrument_skips_solver() {
    let t = table(&[path(0.001, 0.01, 0.7, 30)]);
    let outcome = optimize_sharpe(&t, 100.0, DAILY, &OptimizerConfig::default()).unwrap();

    assert_eq!(outcome.allocation.weights(), &[1.0]);
    assert!(!outcome.solver_invoked);
    assert_eq!(outcome.iterations, 0);
  }

  #[test]
  fn single_constant_instrument_still_returns_full_weight() {
    let t = table(&[vec![10.0; 5]]);
    let allocation = optimize(&t, 100.0, DAILY).unwrap();

    assert_eq!(allocation.weights(), &[1.0]);
  }

  #[traced_test]
  #[test]
  fn matches_grid_search_for_two_assets() {
    let t = table(&[path(0.0015, 0.01, 0.9, 120), path(0.0005, 0.02, 1.7, 120)]);
    let outcome = optimize_sharpe(&t, 100.0, DAILY, &OptimizerConfig::default()).unwrap();

    let grid_best = (0..=1000)
      .map(|k| {
        let w = k as f64 / 1000.0;
        sharpe_of(&t, &[w, 1.0 - w])
      })
      .fold(f64::NEG_INFINITY, f64::max);

    assert!(outcome.solver_invoked);
    assert!(outcome.sharpe_ratio.unwrap() >= grid_best - 1e-3 * grid_best.abs().max(1.0));
    assert!(logs_contain("sharpe optimization converged"));
  }

  #[test]
  fn improves_on_uniform_allocation() {
    let t = table(&[
      path(0.002, 0.01, 0.5, 90),
      path(-0.001, 0.03, 1.1, 90),
      path(0.0008, 0.015, 2.3, 90),
    ]);
    let allocation = optimize(&t, 10_000.0, DAILY).unwrap();

    assert!(sharpe_of(&t, allocation.weights()) >= sharpe_of(&t, &[1.0 / 3.0; 3]) - 1e-9);
  }

  #[test]
  fn exhausted_iterations_report_diagnostics() {
    let t = table(&[path(0.002, 0.01, 0.5, 60), path(0.0, 0.02, 1.3, 60)]);
    let config = OptimizerConfig {
      max_iters: 0,
      ..Default::default()
    };

    let err = optimize_sharpe(&t, 100.0, DAILY, &config).unwrap_err();
    match err {
      PortfolioError::Optimization {
        objective,
        iterations,
        ..
      } => {
        assert_eq!(iterations, 0);
        assert_relative_eq!(objective, -sharpe_of(&t, &[0.5, 0.5]), epsilon = 1e-9);
      }
      other => panic!("unexpected error {other:?}"),
    }
  }

  #[test]
  fn constant_prices_leave_nothing_to_optimize() {
    let t = table(&[vec![10.0; 5], vec![20.0; 5]]);

    assert!(matches!(
      optimize(&t, 100.0, DAILY),
      Err(PortfolioError::Optimization { iterations: 0, .. })
    ));
  }

  #[traced_test]
  #[test]
  fn degenerate_uniform_start_falls_back_to_best_instrument() {
    // the two legs cancel exactly under equal weights
    let t = table(&[
      vec![100.0, 110.0, 100.0, 110.0, 100.0, 111.0],
      vec![100.0, 90.0, 100.0, 90.0, 100.0, 89.0],
    ]);
    let outcome = optimize_sharpe(&t, 100.0, DAILY, &OptimizerConfig::default()).unwrap();

    let lead = sharpe_of(&t, &[1.0, 0.0]);
    assert!(lead > sharpe_of(&t, &[0.7, 0.3]));
    assert!(outcome.sharpe_ratio.unwrap() >= lead - 1e-9);
    assert_relative_eq!(outcome.allocation.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    assert!(logs_contain("uniform allocation is degenerate"));
  }

  /// `|w - target|^2`, optionally reporting a sign-flipped or undefined gradient.
  struct Quadratic {
    target: Vec<f64>,
    gradient_sign: f64,
    nan_gradient: bool,
  }

  impl Quadratic {
    fn new(target: &[f64]) -> Self {
      Self {
        target: target.to_vec(),
        gradient_sign: 1.0,
        nan_gradient: false,
      }
    }
  }

  impl CostFunction for Quadratic {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, w: &Vec<f64>) -> std::result::Result<f64, Error> {
      Ok(w.iter().zip(&self.target).map(|(a, b)| (a - b).powi(2)).sum())
    }
  }

  impl Gradient for Quadratic {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, w: &Vec<f64>) -> std::result::Result<Vec<f64>, Error> {
      if self.nan_gradient {
        return Ok(vec![f64::NAN; w.len()]);
      }
      Ok(
        w.iter()
          .zip(&self.target)
          .map(|(a, b)| self.gradient_sign * 2.0 * (a - b))
          .collect(),
      )
    }
  }

  #[test]
  fn executor_reaches_interior_minimum() {
    let (w, f, iterations) =
      minimize(Quadratic::new(&[0.6, 0.3, 0.1]), vec![1.0 / 3.0; 3], &OptimizerConfig::default())
        .unwrap();

    assert!(iterations > 0);
    assert!(f < 1e-12);
    for (wi, ti) in w.iter().zip([0.6, 0.3, 0.1]) {
      assert_relative_eq!(*wi, ti, epsilon = 1e-6);
    }
  }

  #[test]
  fn executor_projects_exterior_minimum_onto_simplex() {
    let (w, _, _) =
      minimize(Quadratic::new(&[1.5, -0.5]), vec![0.5, 0.5], &OptimizerConfig::default()).unwrap();

    assert_relative_eq!(w[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(w[1], 0.0, epsilon = 1e-9);
  }

  #[test]
  fn failed_line_search_is_an_error() {
    let problem = Quadratic {
      gradient_sign: -1.0,
      ..Quadratic::new(&[0.8, 0.2])
    };

    match minimize(problem, vec![0.5, 0.5], &OptimizerConfig::default()).unwrap_err() {
      PortfolioError::Optimization {
        reason,
        objective,
        iterations,
      } => {
        assert_eq!(reason, LINE_SEARCH_FAILED);
        assert_relative_eq!(objective, 0.18, epsilon = 1e-12);
        assert_eq!(iterations, 1);
      }
      other => panic!("unexpected error {other:?}"),
    }
  }

  #[test]
  fn non_finite_gradient_is_an_error() {
    let problem = Quadratic {
      nan_gradient: true,
      ..Quadratic::new(&[0.8, 0.2])
    };

    match minimize(problem, vec![0.5, 0.5], &OptimizerConfig::default()).unwrap_err() {
      PortfolioError::Optimization {
        reason, iterations, ..
      } => {
        assert_eq!(reason, NON_FINITE_GRADIENT);
        assert_eq!(iterations, 0);
      }
      other => panic!("unexpected error {other:?}"),
    }
  }

  #[test]
  fn rejects_non_positive_investment() {
    let t = table(&[path(0.001, 0.01, 0.7, 10), path(0.0, 0.02, 1.1, 10)]);

    assert!(matches!(
      optimize(&t, 0.0, DAILY),
      Err(PortfolioError::Config(_))
    ));
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn optimized_weights_are_feasible(
      drifts in prop::collection::vec(-0.002f64..0.003, 2..5),
      seed in 0.1f64..3.0,
    ) {
      let columns: Vec<Vec<f64>> = drifts
        .iter()
        .enumerate()
        .map(|(j, &mu)| path(mu, 0.01 + 0.005 * j as f64, seed + j as f64, 80))
        .collect();
      let t = table(&columns);

      let allocation = optimize(&t, 100.0, DAILY).unwrap();
      let sum: f64 = allocation.weights().iter().sum();

      prop_assert_eq!(allocation.len(), columns.len());
      prop_assert!((sum - 1.0).abs() < 1e-6);
      prop_assert!(allocation.weights().iter().all(|w| (0.0..=1.0).contains(w)));
    }
  }
}

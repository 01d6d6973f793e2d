use approx::{assert_abs_diff_eq, assert_relative_eq};
use compressible_flow_toolbox::isentropic::{self, IsentropicRatio, IsentropicRatios};
use compressible_flow_toolbox::solver::{Branch, SolverConfig};

const GAMMA: f64 = 1.4;

fn solve(value: f64, ratio: IsentropicRatio, branch: Branch) -> f64 {
    let sol = isentropic::solve_mach(
        value,
        ratio,
        GAMMA,
        branch,
        &isentropic::DEFAULT_GUESS,
        &SolverConfig::default(),
    );
    assert!(sol.converged, "{ratio:?} = {value} did not converge: {sol:?}");
    sol.x
}

#[test]
fn ratios_at_mach_two() {
    let r = IsentropicRatios::at(2.0, GAMMA);
    assert_abs_diff_eq!(r.area, 1.687500, epsilon = 1e-6);
    assert_abs_diff_eq!(r.temperature, 0.555556, epsilon = 1e-6);
    assert_abs_diff_eq!(r.pressure, 0.127805, epsilon = 1e-6);
    assert_abs_diff_eq!(r.density, 0.230048, epsilon = 1e-6);
}

#[test]
fn ratios_at_half_mach() {
    let r = IsentropicRatios::at(0.5, GAMMA);
    assert_abs_diff_eq!(r.area, 1.339844, epsilon = 1e-6);
    assert_abs_diff_eq!(r.temperature, 0.952381, epsilon = 1e-6);
    assert_abs_diff_eq!(r.pressure, 0.843019, epsilon = 1e-6);
    assert_abs_diff_eq!(r.density, 0.885170, epsilon = 1e-6);
}

#[test]
fn sonic_throat_values() {
    // Only A/A* is 1 at the throat; the stagnation ratios take their critical values.
    let r = IsentropicRatios::at(1.0, GAMMA);
    assert_abs_diff_eq!(r.area, 1.0, epsilon = 1e-12);
    assert_relative_eq!(r.temperature, 2.0 / (GAMMA + 1.0), max_relative = 1e-12);
    assert_abs_diff_eq!(r.pressure, 0.528282, epsilon = 1e-6);
    assert_abs_diff_eq!(r.density, 0.633938, epsilon = 1e-6);
}

#[test]
fn area_ratio_branches() {
    assert_abs_diff_eq!(solve(1.5, IsentropicRatio::Area, Branch::Subsonic), 0.430262, epsilon = 1e-6);
    assert_abs_diff_eq!(solve(1.5, IsentropicRatio::Area, Branch::Supersonic), 1.854124, epsilon = 1e-6);
}

#[test]
fn unit_area_ratio_lands_on_sonic_point() {
    for branch in [Branch::Subsonic, Branch::Supersonic] {
        assert_abs_diff_eq!(solve(1.0, IsentropicRatio::Area, branch), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn stagnation_ratios_ignore_branch() {
    let sub = solve(0.5, IsentropicRatio::Temperature, Branch::Subsonic);
    let sup = solve(0.5, IsentropicRatio::Temperature, Branch::Supersonic);
    assert_eq!(sub, sup);
    assert_relative_eq!(sub, 5f64.sqrt(), max_relative = 1e-9);
}

#[test]
fn pressure_ratio_inverts() {
    let m = solve(0.127805, IsentropicRatio::Pressure, Branch::Subsonic);
    assert_abs_diff_eq!(m, 2.0, epsilon = 1e-5);
}

#[test]
fn density_ratio_round_trip() {
    let target = IsentropicRatios::at(3.0, GAMMA).density;
    let m = solve(target, IsentropicRatio::Density, Branch::Subsonic);
    assert_relative_eq!(m, 3.0, max_relative = 1e-6);
}

#[test]
fn only_area_ratio_asks_for_branch() {
    assert!(IsentropicRatio::Area.needs_branch());
    assert!(!IsentropicRatio::Temperature.needs_branch());
    assert!(!IsentropicRatio::Pressure.needs_branch());
    assert!(!IsentropicRatio::Density.needs_branch());
}

#[test]
fn menu_codes_and_labels() {
    assert_eq!(IsentropicRatio::from_code("1"), Some(IsentropicRatio::Area));
    assert_eq!(IsentropicRatio::from_code("4\n"), Some(IsentropicRatio::Density));
    assert_eq!(IsentropicRatio::from_code("5"), None);
    let labels: Vec<_> = IsentropicRatio::ALL.iter().map(|r| r.label()).collect();
    assert_eq!(labels, ["A/A*", "T/Tₜ", "p/pₜ", "ρ/ρₜ"]);
}

#[test]
fn zero_mach_gives_infinite_area() {
    let r = IsentropicRatios::at(0.0, GAMMA);
    assert!(r.area.is_infinite());
    assert_eq!(r.temperature, 1.0);
    assert_eq!(r.pressure, 1.0);
    assert_eq!(r.density, 1.0);
}

#[test]
fn unit_gamma_is_degenerate_but_finite() {
    let r = IsentropicRatios::at(2.0, 1.0);
    assert_eq!(r.temperature, 1.0);
    assert_eq!(r.pressure, 1.0);
    assert_eq!(r.density, 1.0);
    assert_relative_eq!(r.area, 0.5, max_relative = 1e-12);
}

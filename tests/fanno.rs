use approx::assert_abs_diff_eq;
use compressible_flow_toolbox::fanno::{self, FannoRatio, FannoRatios};
use compressible_flow_toolbox::solver::{Branch, SolverConfig};

const GAMMA: f64 = 1.4;

#[test]
fn ratios_at_mach_two_match_tables() {
    let r = FannoRatios::at(2.0, GAMMA);
    assert_abs_diff_eq!(r.temperature, 0.666667, epsilon = 1e-6);
    assert_abs_diff_eq!(r.pressure, 0.408248, epsilon = 1e-6);
    assert_abs_diff_eq!(r.stagnation_pressure, 1.687500, epsilon = 1e-6);
    assert_abs_diff_eq!(r.friction_length, 0.304997, epsilon = 1e-6);
    assert_abs_diff_eq!(r.entropy, 0.523248, epsilon = 1e-6);
    assert_abs_diff_eq!(r.velocity, 1.632993, epsilon = 1e-6);
}

#[test]
fn ratios_at_half_mach_match_tables() {
    let r = FannoRatios::at(0.5, GAMMA);
    assert_abs_diff_eq!(r.temperature, 1.142857, epsilon = 1e-6);
    assert_abs_diff_eq!(r.pressure, 2.138090, epsilon = 1e-6);
    assert_abs_diff_eq!(r.stagnation_pressure, 1.339844, epsilon = 1e-6);
    assert_abs_diff_eq!(r.friction_length, 1.069060, epsilon = 1e-6);
    assert_abs_diff_eq!(r.entropy, 0.292553, epsilon = 1e-6);
    assert_abs_diff_eq!(r.velocity, 0.534522, epsilon = 1e-6);
}

#[test]
fn sonic_state_is_the_reference() {
    let r = FannoRatios::at(1.0, GAMMA);
    for ratio in [
        FannoRatio::Temperature,
        FannoRatio::Pressure,
        FannoRatio::StagnationPressure,
        FannoRatio::Velocity,
    ] {
        assert_abs_diff_eq!(r.get(ratio), 1.0, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(r.friction_length, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(r.entropy, 0.0, epsilon = 1e-12);
}

#[test]
fn iteration_follows_menu_order() {
    let labels: Vec<_> = FannoRatios::at(2.0, GAMMA).iter().map(|(r, _)| r.label()).collect();
    assert_eq!(labels, ["T/T*", "p/p*", "pₜ/pₜ*", "fLₘₐₓ/D", "Sₘₐₓ/R", "V/V*"]);
}

#[test]
fn menu_codes_map_to_ratios() {
    assert_eq!(FannoRatio::from_code("1"), Some(FannoRatio::Temperature));
    assert_eq!(FannoRatio::from_code(" 4\n"), Some(FannoRatio::FrictionLength));
    assert_eq!(FannoRatio::from_code("6"), Some(FannoRatio::Velocity));
    assert_eq!(FannoRatio::from_code("0"), None);
    assert_eq!(FannoRatio::from_code("7"), None);
    assert_eq!(FannoRatio::from_code("T/T*"), None);
}

#[test]
fn temperature_ratio_inverts_on_supersonic_branch() {
    let sol = fanno::solve_mach(
        2.0 / 3.0,
        FannoRatio::Temperature,
        GAMMA,
        Branch::Supersonic,
        &fanno::DEFAULT_GUESS,
        &SolverConfig::default(),
    );
    assert!(sol.converged);
    assert_abs_diff_eq!(sol.x, 2.0, epsilon = 1e-8);
}

#[test]
fn friction_length_has_two_branches() {
    // fLmax/D = 0.3 is reachable both below and above M = 1.
    let cfg = SolverConfig::default();
    let sub = fanno::solve_mach(0.3, FannoRatio::FrictionLength, GAMMA, Branch::Subsonic, &fanno::DEFAULT_GUESS, &cfg);
    let sup = fanno::solve_mach(0.3, FannoRatio::FrictionLength, GAMMA, Branch::Supersonic, &fanno::DEFAULT_GUESS, &cfg);
    assert!(sub.converged && sup.converged);
    assert!(sub.x < 1.0, "subsonic M = {}", sub.x);
    assert!(sup.x > 1.0, "supersonic M = {}", sup.x);
    assert_abs_diff_eq!(FannoRatios::at(sub.x, GAMMA).friction_length, 0.3, epsilon = 1e-9);
    assert_abs_diff_eq!(FannoRatios::at(sup.x, GAMMA).friction_length, 0.3, epsilon = 1e-9);
}

#[test]
fn large_friction_length_stays_on_positive_mach() {
    // fLmax/D is even in M, so the subsonic Newton step from 0.3 overshoots past zero here.
    let cfg = SolverConfig::default();
    for mach in [0.02, 0.025, 0.05, 0.075, 0.1, 0.15] {
        let target = FannoRatios::at(mach, GAMMA).friction_length;
        let sol = fanno::solve_mach(target, FannoRatio::FrictionLength, GAMMA, Branch::Subsonic, &fanno::DEFAULT_GUESS, &cfg);
        assert!(sol.converged, "M={mach}: {sol:?}");
        assert!(sol.x > 0.0, "M={mach}: {sol:?}");
        assert_abs_diff_eq!(sol.x, mach, epsilon = 1e-8 * mach);
    }
}

#[test]
fn zero_mach_is_not_guarded() {
    let r = FannoRatios::at(0.0, GAMMA);
    assert_abs_diff_eq!(r.temperature, 1.2, epsilon = 1e-12);
    assert!(r.pressure.is_infinite());
    assert!(r.stagnation_pressure.is_infinite());
    assert!(r.friction_length.is_nan());
    assert!(r.entropy.is_infinite());
    assert_eq!(r.velocity, 0.0);
}

#[test]
fn negative_mach_passes_through() {
    let r = FannoRatios::at(-2.0, GAMMA);
    assert_abs_diff_eq!(r.pressure, -0.408248, epsilon = 1e-6);
    assert!(r.entropy.is_nan());
}

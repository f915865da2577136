use ndarray::Array1;
use num_complex::Complex64;

use tmm::{
    absorption::AbsorpAnalyticFn,
    coherent::{coh_tmm, coh_tmm_reverse},
    derived::{ellips, unpolarized_rt},
    error::TmmError,
    grid::LayerGrid,
    polarization::Polarization,
    position::{
        absorp_in_each_layer, find_in_structure, find_in_structure_inf, layer_starts,
        position_resolved,
    },
    stack::Stack,
};

// Reference values are quoted to eight or nine significant digits
const REL: f64 = 1e-5;
// Quantities evaluated deep inside absorbing layers amplify the rounding of the
// quoted wavenumbers
const REL_DEEP: f64 = 5e-5;
const ABS: f64 = 1e-15;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn assert_close(actual: f64, expected: f64, rel: f64, abs: f64, what: &str) {
    let tol = rel * actual.abs().max(expected.abs()) + abs;
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: got {actual}, expected {expected}"
    );
}

fn assert_close_c(actual: Complex64, expected: Complex64, rel: f64, what: &str) {
    let tol = rel * actual.norm().max(expected.norm()) + ABS;
    assert!(
        (actual - expected).norm() <= tol,
        "{what}: got {actual}, expected {expected}"
    );
}

fn assert_all(actual: &Array1<f64>, expected: &[f64], rel: f64, what: &str) {
    assert_eq!(actual.len(), expected.len(), "{what}");
    for (j, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_close(*a, *e, rel, ABS, &format!("{what}[{j}]"));
    }
}

fn assert_all_c(actual: &Array1<Complex64>, expected: &[Complex64], what: &str) {
    assert_eq!(actual.len(), expected.len(), "{what}");
    for (j, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_close_c(*a, *e, REL, &format!("{what}[{j}]"));
    }
}

/// Five-layer stack with dispersive, absorbing films, evaluated at 400 and 1770.
fn reference_stack(exit_long_wavelength: Complex64) -> Stack {
    let n = LayerGrid::from_layers(vec![
        vec![c(1.5, 0.0), c(1.3, 0.0)],
        vec![c(1.0, 0.4), c(1.2, 0.2)],
        vec![c(2.0, 3.0), c(1.5, 0.3)],
        vec![c(5.0, 0.0), c(4.0, 0.0)],
        vec![c(4.0, 1.0), exit_long_wavelength],
    ])
    .unwrap();
    Stack::new(
        n,
        vec![f64::INFINITY, 200.0, 187.3, 1973.5, f64::INFINITY],
        vec![400.0, 1770.0],
    )
    .unwrap()
}

fn stack() -> Stack {
    reference_stack(c(3.0, 0.1))
}

const TH_0: Complex64 = Complex64::new(0.3, 0.0);

#[test]
fn s_polarized_amplitudes_and_powers() {
    let result = coh_tmm(Polarization::S, &stack(), TH_0).unwrap();
    assert_all_c(
        &result.r,
        &[c(0.14017645, -0.2132843), c(0.22307786, -0.10704008)],
        "r",
    );
    assert_all_c(
        &result.t,
        &[c(1.78669633e-05, -9.79824244e-06), c(-8.86075993e-02, -4.05953564e-01)],
        "t",
    );
    assert_all(&result.reflectance, &[0.06513963, 0.06122131], REL, "R");
    assert_all(&result.transmittance, &[1.15234466e-09, 4.13619185e-01], REL, "T");
    assert_all(&result.power_entering, &[0.93486037, 0.93877869], REL, "power_entering");
}

#[test]
fn s_polarized_layer_amplitudes() {
    let result = coh_tmm(Polarization::S, &stack(), TH_0).unwrap();
    let expected = [
        [
            (c(1.18358724, -0.233272105), c(-0.0434107939, 0.019987801)),
            (c(1.03160316, -0.0728921467), c(0.191474694, -0.034147938)),
        ],
        [
            (c(-0.08595355, 0.106568462), c(-1.36521327e-09, 2.83859953e-10)),
            (c(0.608369346, 0.506683493), c(0.175320349, -0.0958306162)),
        ],
        [
            (c(-1.23112929e-05, 1.37276841e-05), c(-1.94390395e-06, 2.16097082e-06)),
            (c(-0.0654156818, 0.357104644), c(0.0338453387, 0.0404808706)),
        ],
    ];
    for (layer, per_wl) in expected.iter().enumerate() {
        for (j, (v, w)) in per_wl.iter().enumerate() {
            let amp = result.amplitudes[(layer + 1, j)];
            assert_close_c(amp.forward, *v, REL, &format!("v[{}][{j}]", layer + 1));
            assert_close_c(amp.backward, *w, REL, &format!("w[{}][{j}]", layer + 1));
        }
    }
    assert_eq!(result.amplitudes[(0, 0)].forward, c(0.0, 0.0));
    assert_eq!(result.amplitudes[(4, 1)].forward, result.t[1]);
    assert_eq!(result.amplitudes[(4, 1)].backward, c(0.0, 0.0));
}

#[test]
fn p_polarized_amplitudes_and_powers() {
    let result = coh_tmm(Polarization::P, &stack(), TH_0).unwrap();
    assert_all_c(
        &result.r,
        &[c(-0.12140058, 0.15103645), c(-0.21104259, 0.07430242)],
        "r",
    );
    assert_all_c(
        &result.t,
        &[c(1.82536479e-05, -1.06422631e-05), c(-9.02947159e-02, -4.09448171e-01)],
        "t",
    );
    assert_all(&result.reflectance, &[0.03755011, 0.05005982], REL, "R");
    assert_all(&result.transmittance, &[1.24068740e-09, 4.21184461e-01], REL, "T");
    assert_all(&result.power_entering, &[0.96244989, 0.94994018], REL, "power_entering");

    let expected = [
        [
            (c(1.17017431, -0.243748228), c(0.0440679361, -0.015394)),
            (c(1.02922989, -0.0782628087), c(-0.184573, 0.0179809491)),
        ],
        [
            (c(-0.0859886075, 0.113689959), c(1.39851113e-09, -3.01497601e-10)),
            (c(0.607730278, 0.50714403), c(-0.168609283, 0.086496688)),
        ],
        [
            (c(-1.2396761e-05, 1.4562392e-05), c(1.93199813e-06, -2.24107827e-06)),
            (c(-0.0652504472, 0.360299246), c(-0.0333430797, -0.0397852657)),
        ],
    ];
    for (layer, per_wl) in expected.iter().enumerate() {
        for (j, (v, w)) in per_wl.iter().enumerate() {
            let amp = result.amplitudes[(layer + 1, j)];
            assert_close_c(amp.forward, *v, REL, &format!("v[{}][{j}]", layer + 1));
            assert_close_c(amp.backward, *w, REL, &format!("w[{}][{j}]", layer + 1));
        }
    }
}

#[test]
fn wavenumbers_and_angles() {
    let result = coh_tmm(Polarization::S, &stack(), TH_0).unwrap();
    let kz = [
        [c(0.02250959, 0.0), c(0.00440866, 0.0)],
        [c(0.01435451, 0.00687561), c(0.00404247, 0.00074813)],
        [c(0.03118008, 0.04748033), c(0.00515452, 0.00110011)],
        [c(0.07823055, 0.0), c(0.01413365, 0.0)],
        [c(0.06246792, 0.01579948), c(0.01056188, 0.00035793)],
    ];
    let th = [
        [c(0.3, 0.0), c(0.3, 0.0)],
        [c(0.38659626, -0.16429512), c(0.3162772, -0.05459799)],
        [c(0.06789345, -0.10235287), c(0.24849917, -0.0507924)],
        [c(0.08877261, 0.0), c(0.09619234, 0.0)],
        [c(0.10445527, -0.02621521), c(0.12826687, -0.00429919)],
    ];
    for layer in 0..5 {
        for j in 0..2 {
            assert_close_c(result.kz[(layer, j)], kz[layer][j], REL, &format!("kz[{layer}][{j}]"));
            assert_close_c(result.th[(layer, j)], th[layer][j], REL, &format!("th[{layer}][{j}]"));
        }
    }
}

#[test]
fn reverse_illumination() {
    let stack = reference_stack(c(3.0, 0.0));
    let result = coh_tmm_reverse(Polarization::S, &stack, TH_0).unwrap();
    assert_all_c(
        &result.r,
        &[c(0.44495594, -0.08125146), c(0.13483962, -0.37537464)],
        "r",
    );
    assert_all_c(
        &result.t,
        &[c(5.64612420e-05, -1.46509665e-05), c(-1.94928443e-01, -9.82812305e-01)],
        "t",
    );
    assert_all(&result.reflectance, &[0.20458758, 0.15908784], REL, "R");
    assert_all(&result.transmittance, &[1.22605928e-09, 4.19050975e-01], REL, "T");
    assert_all(&result.power_entering, &[0.75431194, 0.84091216], REL, "power_entering");
}

#[test]
fn ellipsometry_and_unpolarized_power() {
    let e = ellips(&stack(), TH_0).unwrap();
    assert_all(&e.psi, &[0.64939282, 0.73516374], REL, "psi");

    let rt = unpolarized_rt(&stack(), TH_0).unwrap();
    assert_all(&rt.reflectance, &[0.05134487, 0.05564057], REL, "R");
    assert_all(&rt.transmittance, &[1.19651603e-09, 4.17401823e-01], REL, "T");
}

/// (layer, depth) queries inside the reference stack.
const QUERIES: [(usize, f64); 7] = [
    (1, 10.0),
    (1, 200.0),
    (2, 20.0),
    (2, 50.8),
    (3, 10.0),
    (4, 0.0),
    (4, 200.0),
];

fn check_position(pol: Polarization, poyn: [[f64; 7]; 2], absor: [[f64; 7]; 2]) {
    let result = coh_tmm(pol, &stack(), TH_0).unwrap();
    for (q, (layer, dist)) in QUERIES.iter().enumerate() {
        let fields = position_resolved(*layer, *dist, &result).unwrap();
        for j in 0..2 {
            let what = format!("{pol} layer {layer} depth {dist} wl {j}");
            assert_close(fields.poyn[j], poyn[j][q], REL_DEEP, ABS, &format!("poyn {what}"));
            assert_close(fields.absor[j], absor[j][q], REL_DEEP, ABS, &format!("absor {what}"));
        }
    }
}

#[test]
fn s_position_resolved() {
    check_position(
        Polarization::S,
        [
            [
                0.82476945, 0.0259652919, 0.00388663596, 2.08618804e-04, 1.15234465e-09,
                1.15234466e-09, 2.07458676e-12,
            ],
            [
                0.918232659, 0.612787705, 0.574755463, 0.525103871, 0.413619185, 0.413619186,
                0.358444455,
            ],
        ],
        [
            [
                1.02697381e-02, 1.64378595e-04, 3.6907759e-04, 1.98105861e-05, 0.0,
                3.64128877e-11, 6.55547748e-14,
            ],
            [
                2.04057536e-03, 1.07421979e-03, 1.78805499e-03, 1.43715316e-03, 0.0,
                2.96091644e-04, 2.56594499e-04,
            ],
        ],
    );
}

#[test]
fn p_position_resolved() {
    check_position(
        Polarization::P,
        [
            [
                8.45520745e-01, 2.87382013e-02, 4.30170256e-03, 2.30897897e-04, 1.24068740e-09,
                1.24068740e-09, 2.23363177e-12,
            ],
            [
                9.30639570e-01, 6.33536065e-01, 5.95958829e-01, 5.45941168e-01, 4.21184460e-01,
                4.21184461e-01, 3.65000560e-01,
            ],
        ],
        [
            [
                1.08969642e-02, 5.17505408e-04, 4.08492602e-04, 2.19262267e-05, 0.0,
                3.92044315e-11, 7.05804410e-14,
            ],
            [
                1.91824256e-03, 1.12566565e-03, 1.77891531e-03, 1.46979454e-03, 0.0,
                3.01509108e-04, 2.61289301e-04,
            ],
        ],
    );
}

#[test]
fn positions_outside_their_layer_are_rejected() {
    let result = coh_tmm(Polarization::S, &stack(), TH_0).unwrap();
    assert!(matches!(
        position_resolved(0, 20.0, &result),
        Err(TmmError::Geometry(_))
    ));
    assert!(matches!(
        position_resolved(3, 2000.0, &result),
        Err(TmmError::Geometry(_))
    ));
}

struct ProfileFixture {
    a1: [f64; 2],
    a3: [f64; 2],
    amp1: [f64; 2],
    amp2: [f64; 2],
    amp3: [Complex64; 2],
}

fn check_profile(profile: &AbsorpAnalyticFn, expected: &ProfileFixture, what: &str) {
    assert_all(&profile.attenuation, &expected.a1, REL_DEEP, &format!("{what} a1"));
    assert_all(&profile.wavenumber, &expected.a3, REL_DEEP, &format!("{what} a3"));
    assert_all(&profile.backward_amp, &expected.amp1, REL_DEEP, &format!("{what} A1"));
    assert_all(&profile.forward_amp, &expected.amp2, REL_DEEP, &format!("{what} A2"));
    for j in 0..2 {
        assert_close_c(profile.cross_amp[j], expected.amp3[j], REL_DEEP, &format!("{what} A3[{j}]"));
    }
}

const LAYER_1_A1: [f64; 2] = [0.01375122, 0.00149626];
const LAYER_1_A3: [f64; 2] = [0.02870902, 0.00808494];
const LAYER_2_A1: [f64; 2] = [0.09496066, 0.00220022];
const LAYER_2_A3: [f64; 2] = [0.06236016, 0.01030904];

#[test]
fn s_absorption_profiles() {
    let result = coh_tmm(Polarization::S, &stack(), TH_0).unwrap();
    check_profile(
        &AbsorpAnalyticFn::fill_in(&result, 1).unwrap(),
        &ProfileFixture {
            a1: LAYER_1_A1,
            a3: LAYER_1_A3,
            amp1: [2.00290348e-05, 5.19001441e-05],
            amp2: [0.01276183, 0.00146736],
            amp3: [c(-4.91455269e-04, -1.18654706e-04), c(2.74416636e-04, 2.91821819e-05)],
        },
        "s layer 1",
    );
    check_profile(
        &AbsorpAnalyticFn::fill_in(&result, 2).unwrap(),
        &ProfileFixture {
            a1: LAYER_2_A1,
            a3: LAYER_2_A3,
            amp1: [2.55761667e-19, 1.02694503e-04],
            amp2: [0.00246567, 0.00161252],
            amp3: [c(1.94145098e-11, -1.59280064e-11), c(1.49469559e-04, 3.78492113e-04)],
        },
        "s layer 2",
    );
}

#[test]
fn p_absorption_profiles() {
    let result = coh_tmm(Polarization::P, &stack(), TH_0).unwrap();
    check_profile(
        &AbsorpAnalyticFn::fill_in(&result, 1).unwrap(),
        &ProfileFixture {
            a1: LAYER_1_A1,
            a3: LAYER_1_A3,
            amp1: [2.01486783e-05, 4.74646908e-05],
            amp2: [0.01321129, 0.00147049],
            amp3: [c(-3.47185512e-04, -4.56403179e-05), c(2.11762306e-04, 4.49397818e-06)],
        },
        "p layer 1",
    );
    check_profile(
        &AbsorpAnalyticFn::fill_in(&result, 2).unwrap(),
        &ProfileFixture {
            a1: LAYER_2_A1,
            a3: LAYER_2_A3,
            amp1: [2.74885296e-19, 9.28559634e-05],
            amp2: [0.00272899, 0.00162005],
            amp3: [c(2.01399935e-11, -1.73429018e-11), c(1.32514817e-04, 3.12222809e-04)],
        },
        "p layer 2",
    );
}

fn layer_1_profile() -> AbsorpAnalyticFn {
    AbsorpAnalyticFn {
        attenuation: Array1::from(LAYER_1_A1.to_vec()),
        wavenumber: Array1::from(LAYER_1_A3.to_vec()),
        backward_amp: Array1::from(vec![2.00290348e-05, 5.19001441e-05]),
        forward_amp: Array1::from(vec![0.01276183, 0.00146736]),
        cross_amp: Array1::from(vec![
            c(-4.91455269e-04, -1.18654706e-04),
            c(2.74416636e-04, 2.91821819e-05),
        ]),
        thickness: 200.0,
    }
}

#[test]
fn profile_evaluation() {
    let profile = layer_1_profile();
    let zs: Vec<f64> = (0..7).map(|k| 200.0 * k as f64 / 6.0).collect();
    let grid = profile.run_many(&zs);
    let expected = [
        [0.01179895, 0.00772895, 0.00570666, 0.0043161, 0.00277534, 0.00118025, 0.00016438],
        [0.00206809, 0.00196401, 0.00182646, 0.00166052, 0.00147356, 0.00127472, 0.00107422],
    ];
    for j in 0..2 {
        for k in 0..7 {
            assert_close(grid[(j, k)], expected[j][k], 1e-4, 0.0, &format!("run[{j}][{k}]"));
        }
    }
    assert_all(&profile.run(200.0), &[0.00016438, 0.00107422], 1e-4, "run(200)");
}

#[test]
fn profile_arithmetic() {
    let base = layer_1_profile();

    let mut scaled = base.clone();
    scaled.scale(0.7);
    assert_eq!(scaled.attenuation, base.attenuation);
    assert_all(&scaled.backward_amp, &[0.7 * 2.00290348e-05, 0.7 * 5.19001441e-05], REL, "A1");
    assert_all(&scaled.forward_amp, &[0.7 * 0.01276183, 0.7 * 0.00146736], REL, "A2");

    let mut other = base.clone();
    other.backward_amp = Array1::from(vec![2e-05, 5e-05]);
    other.forward_amp = Array1::from(vec![0.05, 0.003]);
    other.cross_amp = Array1::from(vec![c(4.81455269e-04, -1e-04), c(3e-04, 3e-05)]);
    let mut sum = base.clone();
    sum.add(&other).unwrap();
    assert_all(&sum.backward_amp, &[2.00290348e-05 + 2e-05, 5.19001441e-05 + 5e-05], REL, "A1");
    assert_all(&sum.forward_amp, &[0.01276183 + 0.05, 0.00146736 + 0.003], REL, "A2");
    assert_close_c(sum.cross_amp[0], c(-1e-05, -2.18654706e-04), REL, "A3[0]");

    let mut mismatched = base.clone();
    mismatched.attenuation = Array1::from(vec![7.0, 2.0]);
    let mut target = base.clone();
    assert!(matches!(target.add(&mismatched), Err(TmmError::Validation(_))));
}

#[test]
fn absorption_in_each_layer() {
    let result = coh_tmm(Polarization::S, &stack(), TH_0).unwrap();
    let absorbed = absorp_in_each_layer(&result).unwrap();
    let expected = [
        [0.06513963, 0.06122131],
        [0.908895166, 0.325991032],
        [0.0259652025, 0.199168474],
        [0.0, 0.0],
        [1.15234466e-09, 0.413619185],
    ];
    for (layer, row) in expected.iter().enumerate() {
        for (j, want) in row.iter().enumerate() {
            assert_close(
                absorbed[(layer, j)],
                *want,
                REL_DEEP,
                1e-10,
                &format!("absorbed[{layer}][{j}]"),
            );
        }
    }
}

#[test]
fn depth_lookup() {
    let d = [200.0, 187.3, 1973.5];
    let dists: Vec<f64> = (0..10).map(|k| 700.0 * k as f64 / 9.0).collect();
    let expected_layers = [0, 0, 0, 1, 1, 2, 2, 2, 2, 2];
    let expected_dists = [
        0.0,
        77.77777778,
        155.55555556,
        33.33333333,
        111.11111111,
        1.58888889,
        79.36666667,
        157.14444444,
        234.92222222,
        312.7,
    ];

    let finite = find_in_structure(&d, &dists).unwrap();
    let padded = find_in_structure_inf(&[f64::INFINITY, 200.0, 187.3, 1973.5, f64::INFINITY], &dists)
        .unwrap();
    for (k, (a, b)) in finite.iter().zip(&padded).enumerate() {
        assert_eq!(a.layer, expected_layers[k]);
        assert_eq!(b.layer, a.layer + 1);
        assert_eq!(a.distance, b.distance);
        assert!((a.distance - expected_dists[k]).abs() < 1e-6, "{k}: {}", a.distance);
    }

    assert!(matches!(
        find_in_structure(&[f64::INFINITY, 200.0, 187.3, 1973.5, f64::INFINITY], &dists),
        Err(TmmError::Geometry(_))
    ));
}

#[test]
fn layer_start_depths() {
    let starts = layer_starts(&[f64::INFINITY, 200.0, 187.3, 1973.5, f64::INFINITY]);
    assert_eq!(starts.len(), 5);
    assert_eq!(starts[0], f64::NEG_INFINITY);
    for (got, want) in starts[1..].iter().zip([0.0, 200.0, 387.3, 2360.8]) {
        assert!((got - want).abs() < 1e-9);
    }
}

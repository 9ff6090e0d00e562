use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use pwout::Parser;

// one SCF iteration followed by a stress and force printout
const ITERATION: &str = "
     iteration #  1     ecut=    30.00 Ry     beta= 0.70
     total cpu time spent up to now is        0.6 secs
     total energy              =     -15.79441409 Ry
     estimated scf accuracy    <       0.06376655 Ry
     the Fermi energy is     6.5407 ev
     Forces acting on atoms (Ry/au):

     atom    1 type  1   force =    -0.00147138    0.00084950    0.00000000
     atom    2 type  1   force =     0.00137999   -0.00079673    0.00000000
     The non-local contrib.  to forces
     atom    1 type  1   force =     0.00000000    0.00000000    0.00000000
     atom    2 type  1   force =     0.00000000    0.00000000   -0.00000016

     Total force =     0.003294     Total SCF correction =     0.000014

            total   stress  (Ry/bohr**3)                   (kbar)     P=  -77.72
    -0.00055293   0.00000000   0.00000000        -81.34      0.00      0.00
     0.00000000  -0.00055293   0.00000000          0.00    -81.34      0.00
     0.00000000   0.00000000  -0.00047917          0.00      0.00    -70.49
";

fn synthetic_log(iterations: usize) -> String {
    ITERATION.repeat(iterations)
}

fn criterion_benchmark(c: &mut Criterion) {
    let parser = Parser::default();
    for iterations in [1, 100, 10_000] {
        let log = synthetic_log(iterations);
        c.bench_function(&format!("records {}", iterations), |b| {
            b.iter(|| parser.parse(black_box(log.lines())).count())
        });
        c.bench_function(&format!("flatten {}", iterations), |b| {
            b.iter(|| parser.parse_flat(black_box(log.lines())))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

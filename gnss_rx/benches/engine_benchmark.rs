use criterion::{criterion_group, criterion_main, Criterion};
use gnss_rx::*;

const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
const GSV: &[u8] = b"$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75\r\n";
static FULL_ACK_ACK_PACK: [u8; 10] = [0xb5, 0x62, 0x5, 0x1, 0x2, 0x0, 0x6, 0x1, 0xf, 0x38];

fn stream() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(GGA);
    data.extend_from_slice(GSV);
    data.extend_from_slice(&FULL_ACK_ACK_PACK);
    data
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let data = stream();
    for chunk in [1usize, 16, 64, 256] {
        c.bench_function(&format!("engine_poll_chunk_{chunk}"), |b| {
            let mut intake = Intake::<1024>::new();
            let (mut tx, rx) = intake.split();
            let mut engine = Engine::new(rx, Config::default());
            let mut now = 0u32;
            b.iter(|| {
                for piece in data.chunks(chunk) {
                    tx.push_slice(piece);
                    engine.poll(now).unwrap();
                    now = now.wrapping_add(1);
                }
            })
        });
    }

    c.bench_function("sentence_verify", |b| {
        b.iter(|| Sentence::new(std::hint::black_box(GGA)).verify())
    });

    c.bench_function("build_frame", |b| {
        let payload = [0u8; 36];
        b.iter(|| build_frame::<()>(ubx::class::CFG, 0x24, std::hint::black_box(&payload)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

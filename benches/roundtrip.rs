use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use spatialite_blob::gaia::{Endian, GaiaReader, GaiaWriter, GeometryT, LineStringT, Point, PolygonT};

fn square_ring(n: usize) -> LineStringT<Point> {
    let side = n / 4;
    let mut points: Vec<Point> = (0..n)
        .map(|i| {
            let (leg, step) = (i / side, (i % side) as f64);
            match leg {
                0 => Point::new(step, 0.0, Some(4326)),
                1 => Point::new(side as f64, step, Some(4326)),
                2 => Point::new(side as f64 - step, side as f64, Some(4326)),
                _ => Point::new(0.0, side as f64 - step, Some(4326)),
            }
        })
        .collect();
    points.push(points[0]);
    points.into_iter().collect()
}

fn bench_roundtrip(c: &mut Criterion) {
    let geom = GeometryT::Polygon(PolygonT {
        rings: vec![square_ring(1024)],
        srid: Some(4326),
    });
    let writer = GaiaWriter::new();
    let reader = GaiaReader::<Point>::new();

    let mut group = c.benchmark_group("polygon_1k");
    for (label, compress) in [("plain", false), ("compressed", true)] {
        let blob = writer.write(&geom, 4326, Endian::Little, compress).unwrap();
        group.throughput(Throughput::Bytes(blob.len() as u64));
        group.bench_function(format!("write_{label}"), |b| {
            b.iter(|| {
                writer
                    .write(black_box(&geom), 4326, Endian::Little, compress)
                    .unwrap()
            })
        });
        group.bench_function(format!("read_{label}"), |b| {
            b.iter(|| reader.read(black_box(&blob)).unwrap().unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);

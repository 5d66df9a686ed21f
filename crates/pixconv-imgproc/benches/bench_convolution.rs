use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pixconv_image::Image;
use pixconv_imgproc::{
    accel::RayonAccelerator,
    filter::{kernel_from, Kernel},
    parallel::{convolve_parallel, convolve_passes, convolve_single_thread, PassConfig},
};

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convolution");
    let kernel: Kernel = kernel_from("blur").unwrap();

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        // input image
        let image_data = (0..width * height * 3).map(|i| (i % 256) as u8).collect();
        let image = Image::<u8, 3>::new([*width, *height].into(), image_data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("single_thread", &parameter_string),
            &image,
            |b, i| b.iter(|| black_box(convolve_single_thread(i, &kernel))),
        );

        for threads in [2, 4, 8] {
            group.bench_with_input(
                BenchmarkId::new(format!("scoped_{threads}"), &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(convolve_parallel(i, &kernel, threads))),
            );

            let config = PassConfig::default().with_threads(threads).with_repeats(3);
            group.bench_with_input(
                BenchmarkId::new(format!("passes_x3_{threads}"), &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(convolve_passes(i, &kernel, config))),
            );
        }

        let accel = RayonAccelerator::new();
        group.bench_with_input(
            BenchmarkId::new("rayon_x3", &parameter_string),
            &image,
            |b, i| b.iter(|| black_box(accel.apply_passes(i, &kernel, 3))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_convolution);
criterion_main!(benches);

use lloyd2d::{Dataset, KMeans, KMeansError, Point};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Integer K-Means ===\n");

    // Three blobs around (0, 0), (40, 40) and (0, 80)
    let centers = [Point::new(0, 0), Point::new(40, 40), Point::new(0, 80)];
    let mut rng = StdRng::seed_from_u64(42);
    let jitter = Uniform::new_inclusive(-6i64, 6);

    let mut points = Vec::new();
    for center in &centers {
        for _ in 0..20 {
            points.push(Point::new(
                center.x + jitter.sample(&mut rng),
                center.y + jitter.sample(&mut rng),
            ));
        }
    }
    // Seeding takes the first k points, so shuffle to spread them out
    points.shuffle(&mut rng);

    let dataset = Dataset::from_points(&points);
    println!("Dataset: {} points", dataset.n_samples());
    println!("Expected: 3 blobs around {:?}\n", centers);

    for k in 1..=5 {
        match summarize(&dataset, k) {
            Ok(result) => println!("{}", result),
            Err(e) => println!("KMeans(k={}) failed: {}", k, e),
        }
    }

    println!("\n=== Detailed Analysis (k=3) ===");
    let mut kmeans = KMeans::new(3);
    let labels = kmeans.fit_predict(&dataset)?;

    for (cluster, center) in kmeans.cluster_centers.as_ref().unwrap().iter().enumerate() {
        let count = labels.iter().filter(|&&label| label == cluster).count();
        println!("  Cluster {} at {}: {} points", cluster, center, count);
    }
    println!("  Iterations: {}", kmeans.n_iter.unwrap());

    Ok(())
}

fn summarize(dataset: &Dataset, k: usize) -> Result<String, KMeansError> {
    let mut kmeans = KMeans::new(k);
    kmeans.fit(dataset)?;

    let centers: Vec<String> = kmeans
        .cluster_centers
        .unwrap()
        .iter()
        .map(Point::to_string)
        .collect();

    Ok(format!(
        "KMeans(k={}): centers [{}], inertia {}, {} iterations",
        k,
        centers.join(" "),
        kmeans.inertia.unwrap(),
        kmeans.n_iter.unwrap()
    ))
}
